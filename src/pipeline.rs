//! Chat turn lifecycle: submit, pending echo, settle.
//!
//! Each submit appends an optimistic pending turn, then hands the blocking
//! external call to a worker thread that reports back over a channel with the
//! turn's id. The UI thread drains outcomes whenever it pumps, so transcript
//! mutation stays single-threaded while any number of calls are in flight.

use crate::format::format_response;
use crate::logging::{log_debug, log_debug_content};
use crate::notify::{NotificationQueue, Severity};
use crate::responder::Responder;
use crate::transcript::{ResponseState, Transcript, Turn, TurnId, UtteranceSource};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Raw apology reply shown for a failed turn, in responder markup.
pub const FAILURE_REPLY_RAW: &str = "**Sorry, I'm having trouble connecting to the server.**\nPlease try again later or check your internet connection.";

/// Notification raised alongside a failed turn.
pub const CONNECTION_ERROR_NOTICE: &str = "Connection error. Please try again.";

/// Settlement report from a worker thread. Carries the turn id so pairing is
/// explicit, regardless of completion order.
#[derive(Debug)]
pub enum TurnOutcome {
    Resolved { turn: TurnId, text: String },
    Failed { turn: TurnId, reason: String },
}

/// Owns the transcript and the in-flight call plumbing.
pub struct ChatTurnPipeline {
    transcript: Transcript,
    responder: Arc<dyn Responder>,
    outcome_tx: Sender<TurnOutcome>,
    outcome_rx: Receiver<TurnOutcome>,
}

impl ChatTurnPipeline {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        let (outcome_tx, outcome_rx) = unbounded();
        Self {
            transcript: Transcript::new(),
            responder,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Submit one utterance. Whitespace-only input is rejected without
    /// touching the transcript. Returns the new turn's id otherwise.
    pub fn submit(&mut self, utterance: &str, source: UtteranceSource) -> Option<TurnId> {
        let trimmed = utterance.trim();
        if trimmed.is_empty() {
            return None;
        }
        let id = self.transcript.append_pending(trimmed, source);
        log_debug_content(&format!("submit turn {id:?}: {trimmed}"));

        let responder = Arc::clone(&self.responder);
        let outcome_tx = self.outcome_tx.clone();
        let message = trimmed.to_string();
        // The worker closes over this turn's id only; a slow call cannot
        // settle anything but its own turn.
        thread::spawn(move || {
            let outcome = match responder.send(&message) {
                Ok(text) => TurnOutcome::Resolved { turn: id, text },
                Err(err) => TurnOutcome::Failed {
                    turn: id,
                    reason: format!("{err}"),
                },
            };
            let _ = outcome_tx.send(outcome);
        });
        Some(id)
    }

    /// Drain settled outcomes into the transcript. Returns how many turns
    /// settled. Failures also raise one error notification each.
    pub fn drain(&mut self, notifications: &mut NotificationQueue, now: Instant) -> usize {
        let mut settled = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.apply_outcome(outcome, notifications, now) {
                settled += 1;
            }
        }
        settled
    }

    fn apply_outcome(
        &mut self,
        outcome: TurnOutcome,
        notifications: &mut NotificationQueue,
        now: Instant,
    ) -> bool {
        match outcome {
            TurnOutcome::Resolved { turn, text } => {
                self.transcript.resolve(turn, format_response(&text))
            }
            TurnOutcome::Failed { turn, reason } => {
                log_debug(&format!("chat call failed for {turn:?}: {reason}"));
                let settled = self.transcript.fail(turn, reason);
                if settled {
                    notifications.notify(CONNECTION_ERROR_NOTICE, Severity::Error, now);
                }
                settled
            }
        }
    }

    /// Display text for a settled turn's reply: the formatted response, or
    /// the fixed apology for a failed turn.
    pub fn display_reply(turn: &Turn) -> Option<String> {
        match &turn.response {
            ResponseState::Pending => None,
            ResponseState::Resolved(text) => Some(text.clone()),
            ResponseState::Failed(_) => Some(format_response(FAILURE_REPLY_RAW)),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
