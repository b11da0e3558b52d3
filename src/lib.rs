pub mod config;
pub mod controller;
pub mod format;
mod logging;
pub mod notify;
pub mod pipeline;
pub mod responder;
pub mod speech;
pub mod telemetry;
pub mod transcript;
pub mod voice;

pub use logging::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};
pub use notify::{Notification, NotificationQueue, Severity};
pub use speech::{SpeechCapability, SpeechErrorCode, SpeechEvent};
pub use transcript::{ResponseState, Transcript, Turn, TurnId, UtteranceSource};
pub use voice::{VoiceEffect, VoiceSessionState};
