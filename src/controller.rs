//! Interaction controller: routes user intents into the chat pipeline and
//! voice lifecycle events into the notification queue.
//!
//! Single-threaded and event-driven: callers feed intents and pump `tick`;
//! all transcript and notification mutation happens here, in arrival order.

use crate::logging::log_debug;
use crate::notify::{NotificationQueue, Severity};
use crate::pipeline::ChatTurnPipeline;
use crate::responder::Responder;
use crate::speech::CapabilityProbe;
use crate::transcript::{Transcript, TurnId, UtteranceSource};
use crate::voice::{VoiceEffect, VoiceSession, VoiceSessionState, AUTO_SUBMIT_DELAY};
use std::sync::Arc;
use std::time::Instant;

pub struct InteractionController {
    pipeline: ChatTurnPipeline,
    notifications: NotificationQueue,
    /// The one voice session for this controller's lifetime. Never torn down
    /// once constructed.
    voice: Option<VoiceSession>,
    /// Set when the capability is absent or failed to construct. Permanent.
    voice_disabled: bool,
    /// Capability constructor, consumed on first use. Never re-probed.
    probe: CapabilityProbe,
    probed: bool,
    input: String,
    quick_options: Vec<String>,
    listening: bool,
    auto_submit_due: Option<Instant>,
}

impl InteractionController {
    pub fn new(
        responder: Arc<dyn Responder>,
        probe: CapabilityProbe,
        quick_options: Vec<String>,
    ) -> Self {
        Self {
            pipeline: ChatTurnPipeline::new(responder),
            notifications: NotificationQueue::new(),
            voice: None,
            voice_disabled: false,
            probe,
            probed: false,
            input: String::new(),
            quick_options,
            listening: false,
            auto_submit_due: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn transcript(&self) -> &Transcript {
        self.pipeline.transcript()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn quick_options(&self) -> &[String] {
        &self.quick_options
    }

    /// Whether the "Listening..." indicator is showing.
    pub fn listening(&self) -> bool {
        self.listening
    }

    /// Whether voice controls are still usable.
    pub fn voice_enabled(&self) -> bool {
        !self.voice_disabled
    }

    pub fn voice_state(&self) -> VoiceSessionState {
        self.voice
            .as_ref()
            .map(VoiceSession::state)
            .unwrap_or_default()
    }

    /// Explicit submit of the input buffer (button / plain Enter).
    pub fn submit_input(&mut self) -> Option<TurnId> {
        let id = self.pipeline.submit(&self.input, UtteranceSource::Typed)?;
        self.input.clear();
        Some(id)
    }

    /// Submit a quick option's label text verbatim.
    pub fn select_quick_option(&mut self, index: usize) -> Option<TurnId> {
        let label = self.quick_options.get(index)?.clone();
        self.pipeline.submit(&label, UtteranceSource::Typed)
    }

    /// Toggle voice capture: start when idle, stop when listening. A no-op
    /// once voice is disabled.
    pub fn toggle_voice(&mut self, now: Instant) {
        if self.voice_disabled {
            return;
        }
        if self.voice.is_none() {
            self.initialize_voice(now);
        }
        let Some(session) = self.voice.as_mut() else {
            return;
        };
        let effects = if session.state() == VoiceSessionState::Listening {
            session.stop()
        } else {
            match session.start() {
                Ok(effects) => effects,
                Err(err) => {
                    log_debug(&format!("voice start failed: {err:#}"));
                    vec![VoiceEffect::Notify {
                        message: "Failed to start voice input. Please try again.".to_string(),
                        severity: Severity::Error,
                    }]
                }
            }
        };
        self.apply_voice_effects(effects, now);
    }

    /// Construct the capability exactly once. Absence or failure disables
    /// the voice control for the rest of the session.
    fn initialize_voice(&mut self, now: Instant) {
        if self.probed {
            return;
        }
        self.probed = true;
        match self.probe.take() {
            None => {
                self.voice_disabled = true;
                self.notifications.notify(
                    "Voice input not supported on this system",
                    Severity::Warning,
                    now,
                );
            }
            Some(mut factory) => match factory() {
                Ok(capability) => {
                    self.voice = Some(VoiceSession::new(capability));
                }
                Err(err) => {
                    log_debug(&format!("voice capability construction failed: {err:#}"));
                    self.voice_disabled = true;
                    self.notifications.notify(
                        "Voice input initialization failed",
                        Severity::Error,
                        now,
                    );
                }
            },
        }
    }

    /// Cooperative pump: expire notifications, fire due auto-submits, drain
    /// voice events and settled chat turns.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.tick(now);

        if let Some(due) = self.auto_submit_due {
            if now >= due {
                self.auto_submit_due = None;
                // Submits whatever the input buffer holds by now, so a user
                // edit within the delay window wins over the raw transcript.
                if self
                    .pipeline
                    .submit(&self.input, UtteranceSource::Voice)
                    .is_some()
                {
                    self.input.clear();
                }
            }
        }

        if let Some(session) = self.voice.as_mut() {
            let effects = session.poll();
            self.apply_voice_effects(effects, now);
        }

        self.pipeline.drain(&mut self.notifications, now);
    }

    fn apply_voice_effects(&mut self, effects: Vec<VoiceEffect>, now: Instant) {
        for effect in effects {
            match effect {
                VoiceEffect::ShowListening => self.listening = true,
                VoiceEffect::ClearListening => self.listening = false,
                VoiceEffect::Notify { message, severity } => {
                    self.notifications.notify(message, severity, now);
                }
                VoiceEffect::InsertTranscript(text) => {
                    self.input = text;
                }
                VoiceEffect::AutoSubmitTranscript(text) => {
                    self.input = text;
                    self.auto_submit_due = Some(now + AUTO_SUBMIT_DELAY);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::ResponderError;
    use crate::speech::{ScriptedCapability, SpeechEvent};
    use crate::transcript::{ResponseState, Turn};
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct EchoResponder;

    impl Responder for EchoResponder {
        fn send(&self, message: &str) -> Result<String, ResponderError> {
            Ok(format!("echo: {message}"))
        }
    }

    struct FailingResponder;

    impl Responder for FailingResponder {
        fn send(&self, _message: &str) -> Result<String, ResponderError> {
            Err(ResponderError::Status(500))
        }
    }

    fn controller_with(responder: Arc<dyn Responder>, probe: CapabilityProbe) -> InteractionController {
        InteractionController::new(
            responder,
            probe,
            vec!["What are the admission requirements?".to_string()],
        )
    }

    fn scripted_probe(events: Vec<SpeechEvent>) -> CapabilityProbe {
        let mut events = Some(events);
        Some(Box::new(move || {
            let events = events.take().unwrap_or_default();
            let capability: Box<dyn crate::speech::SpeechCapability> =
                Box::new(ScriptedCapability::new(events));
            Ok(capability)
        }))
    }

    fn tick_until_settled(controller: &mut InteractionController, id: TurnId) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            controller.tick(Instant::now());
            if controller.transcript().turn(id).is_some_and(Turn::is_settled) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("turn {id:?} did not settle");
    }

    #[test]
    fn empty_submission_never_mutates_transcript() {
        let mut controller = controller_with(Arc::new(EchoResponder), None);
        controller.set_input("");
        assert!(controller.submit_input().is_none());
        controller.set_input("   ");
        assert!(controller.submit_input().is_none());
        assert!(controller.transcript().turns().is_empty());
    }

    #[test]
    fn typed_submit_clears_input_and_resolves() {
        let mut controller = controller_with(Arc::new(EchoResponder), None);
        controller.set_input("hello there");
        let id = controller.submit_input().expect("accepted");
        assert_eq!(controller.input(), "");

        tick_until_settled(&mut controller, id);
        let turn = controller.transcript().turn(id).unwrap();
        assert_eq!(turn.source, UtteranceSource::Typed);
        assert_eq!(
            turn.response,
            ResponseState::Resolved("echo: hello there".to_string())
        );
    }

    #[test]
    fn quick_option_submits_label_verbatim() {
        let mut controller = controller_with(Arc::new(EchoResponder), None);
        let id = controller.select_quick_option(0).expect("accepted");
        assert_eq!(
            controller.transcript().turn(id).map(|t| t.utterance.clone()),
            Some("What are the admission requirements?".to_string())
        );
        assert!(controller.select_quick_option(5).is_none());
    }

    #[test]
    fn absent_capability_warns_once_and_disables_voice() {
        let mut controller = controller_with(Arc::new(EchoResponder), None);
        let now = Instant::now();

        controller.toggle_voice(now);
        assert!(!controller.voice_enabled());
        let visible = controller.notifications().visible().expect("warning shown");
        assert_eq!(visible.severity, Severity::Warning);
        assert!(visible.message.contains("not supported"));

        // Further toggles are no-ops: no new notification, still disabled.
        let first_created = visible.created_at;
        controller.toggle_voice(now + Duration::from_millis(10));
        let visible = controller.notifications().visible().expect("same warning");
        assert_eq!(visible.created_at, first_created);
    }

    #[test]
    fn failing_capability_construction_is_probed_exactly_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let probe: CapabilityProbe = Some(Box::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("no recognizer"))
        }));
        let mut controller = controller_with(Arc::new(EchoResponder), probe);
        let now = Instant::now();

        controller.toggle_voice(now);
        controller.toggle_voice(now + Duration::from_millis(10));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(!controller.voice_enabled());
        let visible = controller.notifications().visible().expect("error shown");
        assert_eq!(visible.severity, Severity::Error);
        assert!(visible.message.contains("initialization failed"));
    }

    #[test]
    fn complete_voice_transcript_auto_submits_after_delay() {
        let probe = scripted_probe(vec![
            SpeechEvent::Started,
            SpeechEvent::Finalized {
                transcript: "what are the fees?".to_string(),
            },
            SpeechEvent::Ended,
        ]);
        let mut controller = controller_with(Arc::new(EchoResponder), probe);
        let now = Instant::now();

        controller.toggle_voice(now);
        assert!(controller.listening());

        controller.tick(now);
        // Transcript placed into the input, submission scheduled but not fired.
        assert_eq!(controller.input(), "what are the fees?");
        assert!(controller.transcript().turns().is_empty());
        assert!(!controller.listening());

        controller.tick(now + Duration::from_millis(999));
        assert!(controller.transcript().turns().is_empty());

        controller.tick(now + Duration::from_millis(1001));
        assert_eq!(controller.transcript().turns().len(), 1);
        let turn = &controller.transcript().turns()[0];
        assert_eq!(turn.utterance, "what are the fees?");
        assert_eq!(turn.source, UtteranceSource::Voice);
        assert_eq!(controller.input(), "");
    }

    #[test]
    fn short_voice_transcript_waits_for_manual_confirmation() {
        let probe = scripted_probe(vec![
            SpeechEvent::Started,
            SpeechEvent::Finalized {
                transcript: "admissions".to_string(),
            },
            SpeechEvent::Ended,
        ]);
        let mut controller = controller_with(Arc::new(EchoResponder), probe);
        let now = Instant::now();

        controller.toggle_voice(now);
        controller.tick(now);
        assert_eq!(controller.input(), "admissions");

        // Never auto-submitted, no matter how long we wait.
        controller.tick(now + Duration::from_secs(10));
        assert!(controller.transcript().turns().is_empty());

        let id = controller.submit_input().expect("manual confirm");
        assert_eq!(
            controller.transcript().turn(id).map(|t| t.source),
            Some(UtteranceSource::Typed)
        );
    }

    #[test]
    fn voice_error_clears_indicator_and_notifies() {
        let probe = scripted_probe(vec![
            SpeechEvent::Started,
            SpeechEvent::Error(crate::speech::SpeechErrorCode::NotAllowed),
        ]);
        let mut controller = controller_with(Arc::new(EchoResponder), probe);
        let now = Instant::now();

        controller.toggle_voice(now);
        assert!(controller.listening());
        controller.tick(now);

        assert!(!controller.listening());
        assert_eq!(controller.voice_state(), VoiceSessionState::Idle);
        let visible = controller.notifications().visible().expect("error");
        assert_eq!(visible.severity, Severity::Error);
        assert!(visible.message.contains("permission denied"));
        // Voice stays enabled: transcription errors are transient.
        assert!(controller.voice_enabled());
    }

    #[test]
    fn chat_failure_surfaces_apology_and_notification() {
        let mut controller = controller_with(Arc::new(FailingResponder), None);
        controller.set_input("hello");
        let id = controller.submit_input().expect("accepted");
        tick_until_settled(&mut controller, id);

        let turn = controller.transcript().turn(id).unwrap();
        assert!(matches!(turn.response, ResponseState::Failed(_)));
        let reply = ChatTurnPipeline::display_reply(turn).expect("apology");
        assert!(reply.contains("having trouble connecting"));
        let visible = controller.notifications().visible().expect("notice");
        assert_eq!(visible.severity, Severity::Error);
    }

    #[test]
    fn user_edit_within_auto_submit_window_wins() {
        let probe = scripted_probe(vec![
            SpeechEvent::Started,
            SpeechEvent::Finalized {
                transcript: "tell me about courses.".to_string(),
            },
            SpeechEvent::Ended,
        ]);
        let mut controller = controller_with(Arc::new(EchoResponder), probe);
        let now = Instant::now();

        controller.toggle_voice(now);
        controller.tick(now);
        controller.set_input("tell me about hostel fees.");

        controller.tick(now + Duration::from_millis(1001));
        assert_eq!(
            controller.transcript().turns()[0].utterance,
            "tell me about hostel fees."
        );
    }
}
