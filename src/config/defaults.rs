//! Default values shared by CLI parsing and tests.

/// Chat endpoint of the external responder.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

/// Speech recognition locale. Single-locale by design.
pub const DEFAULT_LANG: &str = "en-US";

/// Predefined quick-option prompts; the label text is submitted verbatim.
pub fn default_quick_options() -> Vec<String> {
    [
        "What are the admission requirements?",
        "Tell me about the fee structure",
        "What courses are offered?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
