//! Voice capture session state machine.
//!
//! The session wraps the external speech capability as an explicit FSM with a
//! pure transition function, so the whole lifecycle can be unit-tested by
//! feeding synthetic events. All capability failures map back to `Idle` with
//! a user-facing notification effect; nothing here is fatal.

use crate::notify::Severity;
use crate::speech::{SpeechCapability, SpeechEvent};
use anyhow::Result;
use std::time::Duration;

/// Delay before a finalized transcript is auto-submitted.
pub const AUTO_SUBMIT_DELAY: Duration = Duration::from_secs(1);

/// Minimum trimmed length before auto-submit is considered.
const AUTO_SUBMIT_MIN_LEN: usize = 3;
/// Word count above which a transcript counts as a complete utterance.
const AUTO_SUBMIT_MIN_WORDS: usize = 2;

/// Capture session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceSessionState {
    /// No capture in progress.
    #[default]
    Idle,
    /// Capability is recording.
    Listening,
    /// Transcript received, waiting for the capability to wind down.
    Finalizing,
}

impl VoiceSessionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Finalizing => "finalizing",
        }
    }
}

/// Side effects requested by a transition. The controller applies these;
/// the transition function itself mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEffect {
    /// Show the "Listening..." indicator.
    ShowListening,
    /// Clear the listening indicator.
    ClearListening,
    /// Raise a notification.
    Notify { message: String, severity: Severity },
    /// Place the transcript into the input buffer for manual confirmation.
    InsertTranscript(String),
    /// Place the transcript into the input buffer and submit it after
    /// [`AUTO_SUBMIT_DELAY`].
    AutoSubmitTranscript(String),
}

/// Whether a finalized transcript should be sent without confirmation.
///
/// Heuristic preserved verbatim from the original behavior: a transcript
/// longer than 3 characters that ends in sentence punctuation or contains
/// more than two words is treated as a complete utterance.
pub fn should_auto_submit(transcript: &str) -> bool {
    let trimmed = transcript.trim();
    trimmed.len() > AUTO_SUBMIT_MIN_LEN
        && (trimmed.ends_with('.')
            || trimmed.ends_with('?')
            || trimmed.ends_with('!')
            || trimmed.split_whitespace().count() > AUTO_SUBMIT_MIN_WORDS)
}

/// Pure transition function for capability events.
///
/// Events that are invalid for the current state are ignored by design: a
/// late `Ended` after `stop()`, or a stray `Started`, must not disturb a
/// newer capture.
pub fn transition(state: VoiceSessionState, event: &SpeechEvent) -> (VoiceSessionState, Vec<VoiceEffect>) {
    use VoiceSessionState::{Finalizing, Idle, Listening};
    match (state, event) {
        (Listening, SpeechEvent::Started) => (Listening, vec![VoiceEffect::ShowListening]),
        (Listening, SpeechEvent::Finalized { transcript }) => {
            let trimmed = transcript.trim();
            if trimmed.is_empty() {
                return (Finalizing, Vec::new());
            }
            let mut effects = vec![VoiceEffect::Notify {
                message: format!("Voice input captured: \"{trimmed}\""),
                severity: Severity::Success,
            }];
            if should_auto_submit(trimmed) {
                effects.push(VoiceEffect::AutoSubmitTranscript(trimmed.to_string()));
            } else {
                effects.push(VoiceEffect::InsertTranscript(trimmed.to_string()));
            }
            (Finalizing, effects)
        }
        (Listening | Finalizing, SpeechEvent::Ended) => (Idle, vec![VoiceEffect::ClearListening]),
        (Listening | Finalizing, SpeechEvent::Error(code)) => (
            Idle,
            vec![
                VoiceEffect::ClearListening,
                VoiceEffect::Notify {
                    message: code.user_message().to_string(),
                    severity: Severity::Error,
                },
            ],
        ),
        // Anything arriving while idle, or a duplicate result, is dropped.
        (state, _) => (state, Vec::new()),
    }
}

/// A live capture session bound to one capability instance.
///
/// Exactly one session exists per controller lifetime; it is never torn down,
/// only returned to `Idle` between captures.
pub struct VoiceSession {
    state: VoiceSessionState,
    capability: Box<dyn SpeechCapability>,
}

impl VoiceSession {
    pub fn new(capability: Box<dyn SpeechCapability>) -> Self {
        Self {
            state: VoiceSessionState::Idle,
            capability,
        }
    }

    pub fn state(&self) -> VoiceSessionState {
        self.state
    }

    /// Begin a capture. Valid only from `Idle`; otherwise a silent no-op.
    pub fn start(&mut self) -> Result<Vec<VoiceEffect>> {
        if self.state != VoiceSessionState::Idle {
            return Ok(Vec::new());
        }
        self.capability.begin()?;
        self.state = VoiceSessionState::Listening;
        Ok(vec![
            VoiceEffect::ShowListening,
            VoiceEffect::Notify {
                message: "Voice input started. Please speak clearly.".to_string(),
                severity: Severity::Info,
            },
        ])
    }

    /// End a capture early. Valid only from `Listening`; otherwise a no-op.
    ///
    /// The session returns to `Idle` immediately; whatever the capability
    /// still emits for the cancelled capture is ignored.
    pub fn stop(&mut self) -> Vec<VoiceEffect> {
        if self.state != VoiceSessionState::Listening {
            return Vec::new();
        }
        self.capability.cancel();
        self.state = VoiceSessionState::Idle;
        vec![
            VoiceEffect::ClearListening,
            VoiceEffect::Notify {
                message: "Voice input stopped".to_string(),
                severity: Severity::Info,
            },
        ]
    }

    /// Drain pending capability events through the transition function.
    pub fn poll(&mut self) -> Vec<VoiceEffect> {
        let mut effects = Vec::new();
        while let Some(event) = self.capability.poll_event() {
            let (next, mut batch) = transition(self.state, &event);
            self.state = next;
            effects.append(&mut batch);
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{ScriptedCapability, SpeechErrorCode};

    fn notify_messages(effects: &[VoiceEffect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                VoiceEffect::Notify { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn auto_submit_requires_length_and_shape() {
        // Too short, regardless of punctuation.
        assert!(!should_auto_submit("ok."));
        assert!(!should_auto_submit("hi"));
        assert!(!should_auto_submit("   "));

        // Long enough with terminal punctuation.
        assert!(should_auto_submit("help."));
        assert!(should_auto_submit("what are the fees?"));
        assert!(should_auto_submit("stop!"));

        // Long enough with more than two words, no punctuation.
        assert!(should_auto_submit("show me courses"));

        // Long enough but one or two bare words: manual confirmation.
        assert!(!should_auto_submit("admissions"));
        assert!(!should_auto_submit("course list"));
    }

    #[test]
    fn auto_submit_trims_before_judging() {
        assert!(should_auto_submit("  what are the fees?  "));
        assert!(!should_auto_submit("  hi  "));
    }

    #[test]
    fn normal_path_listening_to_idle() {
        let (state, effects) = transition(
            VoiceSessionState::Listening,
            &SpeechEvent::Finalized {
                transcript: "what are the fees?".to_string(),
            },
        );
        assert_eq!(state, VoiceSessionState::Finalizing);
        assert!(effects.contains(&VoiceEffect::AutoSubmitTranscript("what are the fees?".to_string())));

        let (state, effects) = transition(state, &SpeechEvent::Ended);
        assert_eq!(state, VoiceSessionState::Idle);
        assert_eq!(effects, vec![VoiceEffect::ClearListening]);
    }

    #[test]
    fn short_transcript_goes_to_input_not_auto_submit() {
        let (_, effects) = transition(
            VoiceSessionState::Listening,
            &SpeechEvent::Finalized {
                transcript: " admissions ".to_string(),
            },
        );
        assert!(effects.contains(&VoiceEffect::InsertTranscript("admissions".to_string())));
        assert!(!effects
            .iter()
            .any(|e| matches!(e, VoiceEffect::AutoSubmitTranscript(_))));
    }

    #[test]
    fn whitespace_only_transcript_is_dropped() {
        let (state, effects) = transition(
            VoiceSessionState::Listening,
            &SpeechEvent::Finalized {
                transcript: "   ".to_string(),
            },
        );
        assert_eq!(state, VoiceSessionState::Finalizing);
        assert!(effects.is_empty());
    }

    #[test]
    fn errors_return_to_idle_with_mapped_notification() {
        for (code, fragment) in [
            (SpeechErrorCode::NoSpeech, "No speech detected"),
            (SpeechErrorCode::AudioCapture, "Microphone not found"),
            (SpeechErrorCode::NotAllowed, "permission denied"),
            (SpeechErrorCode::Network, "Network error"),
            (SpeechErrorCode::Aborted, "was stopped"),
            (SpeechErrorCode::Other("weird".into()), "Please try again"),
        ] {
            let (state, effects) =
                transition(VoiceSessionState::Listening, &SpeechEvent::Error(code));
            assert_eq!(state, VoiceSessionState::Idle);
            assert_eq!(effects[0], VoiceEffect::ClearListening);
            let messages = notify_messages(&effects);
            assert_eq!(messages.len(), 1);
            assert!(messages[0].contains(fragment), "got {}", messages[0]);
        }
    }

    #[test]
    fn error_before_result_still_clears_listening() {
        // Error arrives while finalizing (result seen, end not yet).
        let (state, effects) = transition(
            VoiceSessionState::Finalizing,
            &SpeechEvent::Error(SpeechErrorCode::Network),
        );
        assert_eq!(state, VoiceSessionState::Idle);
        assert!(effects.contains(&VoiceEffect::ClearListening));
    }

    #[test]
    fn idle_ignores_stray_events() {
        for event in [
            SpeechEvent::Started,
            SpeechEvent::Finalized {
                transcript: "late".to_string(),
            },
            SpeechEvent::Ended,
            SpeechEvent::Error(SpeechErrorCode::Aborted),
        ] {
            let (state, effects) = transition(VoiceSessionState::Idle, &event);
            assert_eq!(state, VoiceSessionState::Idle);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn session_start_is_noop_while_listening() {
        let capability = ScriptedCapability::new(Vec::new());
        let mut session = VoiceSession::new(Box::new(capability));

        let effects = session.start().expect("start");
        assert_eq!(session.state(), VoiceSessionState::Listening);
        assert!(effects.contains(&VoiceEffect::ShowListening));

        let effects = session.start().expect("second start");
        assert!(effects.is_empty());
    }

    #[test]
    fn session_stop_cancels_and_returns_to_idle() {
        let capability = ScriptedCapability::new(vec![SpeechEvent::Ended]);
        let mut session = VoiceSession::new(Box::new(capability));
        session.start().expect("start");

        let effects = session.stop();
        assert_eq!(session.state(), VoiceSessionState::Idle);
        let messages = notify_messages(&effects);
        assert_eq!(messages, vec!["Voice input stopped"]);

        // Late capability end after stop is ignored.
        let effects = session.poll();
        assert!(effects.is_empty());
        assert_eq!(session.state(), VoiceSessionState::Idle);
    }

    #[test]
    fn session_stop_is_noop_while_idle() {
        let capability = ScriptedCapability::new(Vec::new());
        let mut session = VoiceSession::new(Box::new(capability));
        assert!(session.stop().is_empty());
    }

    #[test]
    fn session_poll_runs_full_capture() {
        let capability = ScriptedCapability::new(vec![
            SpeechEvent::Started,
            SpeechEvent::Finalized {
                transcript: "tell me about the courses offered.".to_string(),
            },
            SpeechEvent::Ended,
        ]);
        let mut session = VoiceSession::new(Box::new(capability));
        session.start().expect("start");

        let effects = session.poll();
        assert_eq!(session.state(), VoiceSessionState::Idle);
        assert!(effects.contains(&VoiceEffect::AutoSubmitTranscript(
            "tell me about the courses offered.".to_string()
        )));
        assert!(effects.contains(&VoiceEffect::ClearListening));
    }
}
