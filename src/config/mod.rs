//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{ArgAction, Parser};

pub use defaults::{default_quick_options, DEFAULT_ENDPOINT, DEFAULT_LANG};

/// CLI options for the voxchat assistant.
#[derive(Debug, Parser, Clone)]
#[command(about = "VoxChat assistant", author, version)]
pub struct AppConfig {
    /// Chat endpoint of the external responder
    #[arg(long, env = "VOXCHAT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Speech recognition locale
    #[arg(long, default_value = DEFAULT_LANG)]
    pub lang: String,

    /// Quick-option prompt shown as a shortcut (repeatable; replaces defaults)
    #[arg(long = "quick-option", action = ArgAction::Append, value_name = "TEXT")]
    pub quick_options: Vec<String>,

    /// Disable voice capture even if a capability is present
    #[arg(long = "no-voice", default_value_t = false)]
    pub no_voice: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "VOXCHAT_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VOXCHAT_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging utterance/transcript snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "VOXCHAT_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

impl AppConfig {
    /// Quick options from the CLI, or the defaults when none were given.
    pub fn quick_options(&self) -> Vec<String> {
        if self.quick_options.is_empty() {
            default_quick_options()
        } else {
            self.quick_options.clone()
        }
    }
}
