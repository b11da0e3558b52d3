//! Speech-to-text capability boundary.
//!
//! The host capability is an external event source that may be absent
//! entirely. It is probed once; the session layer never re-probes.

use anyhow::Result;

/// Lifecycle events delivered by the speech capability.
///
/// A single capture delivers at most one `Finalized` transcript, then `Ended`;
/// an `Error` replaces both. Events arriving while the session is idle are
/// ignored by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Finalized { transcript: String },
    Ended,
    Error(SpeechErrorCode),
}

/// Error codes reported by the external capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechErrorCode {
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Network,
    Aborted,
    Other(String),
}

impl SpeechErrorCode {
    /// Parse a capability-reported code string. Unknown codes are preserved.
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "network" => Self::Network,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    /// User-facing message for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoSpeech => "No speech detected. Please speak clearly and try again.",
            Self::AudioCapture => "Microphone not found. Please check your microphone.",
            Self::NotAllowed => "Microphone permission denied. Please allow microphone access.",
            Self::Network => "Network error. Please check your internet connection.",
            Self::Aborted => "Voice recognition was stopped.",
            Self::Other(_) => "Voice recognition error. Please try again.",
        }
    }
}

/// One-shot speech recognition source.
///
/// `begin` requests a capture, `cancel` asks it to end early, and
/// `poll_event` drains lifecycle events without blocking the caller.
pub trait SpeechCapability: Send {
    fn begin(&mut self) -> Result<()>;
    fn cancel(&mut self);
    fn poll_event(&mut self) -> Option<SpeechEvent>;
}

/// Constructor for the host capability. `None` means speech recognition is
/// absent on this system; construction may still fail at call time.
pub type CapabilityProbe = Option<Box<dyn FnMut() -> Result<Box<dyn SpeechCapability>> + Send>>;

/// Scripted capability for exercising the session layer without a microphone.
#[cfg(test)]
pub(crate) struct ScriptedCapability {
    pub events: std::collections::VecDeque<SpeechEvent>,
    pub began: usize,
    pub cancelled: usize,
}

#[cfg(test)]
impl ScriptedCapability {
    pub fn new(events: Vec<SpeechEvent>) -> Self {
        Self {
            events: events.into(),
            began: 0,
            cancelled: 0,
        }
    }
}

#[cfg(test)]
impl SpeechCapability for ScriptedCapability {
    fn begin(&mut self) -> Result<()> {
        self.began += 1;
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancelled += 1;
    }

    fn poll_event(&mut self) -> Option<SpeechEvent> {
        self.events.pop_front()
    }
}
