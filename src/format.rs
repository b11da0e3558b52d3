//! Display formatting for raw responder text.
//!
//! One pass, four substitutions, fixed order. This is deliberately not a
//! markdown parser: nested or malformed markup beyond these spans is left
//! exactly as it arrived.

use regex::Regex;
use std::sync::OnceLock;

/// Bold span wrappers (SGR bold on/off).
pub const BOLD_ON: &str = "\x1b[1m";
pub const BOLD_OFF: &str = "\x1b[22m";
/// Inline code wrappers (SGR reverse video on/off).
pub const CODE_ON: &str = "\x1b[7m";
pub const CODE_OFF: &str = "\x1b[27m";

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex should compile"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\* (.+)$").expect("bullet regex should compile"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("code regex should compile"))
}

/// Turn raw responder text into display-ready terminal text.
///
/// Order: line breaks, bold spans, bullet lines, inline code.
pub fn format_response(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = bold_re().replace_all(&text, format!("{BOLD_ON}$1{BOLD_OFF}"));
    let text = bullet_re().replace_all(&text, "\u{2022} $1");
    let text = code_re().replace_all(&text, format!("{CODE_ON}$1{CODE_OFF}"));
    text.into_owned()
}
