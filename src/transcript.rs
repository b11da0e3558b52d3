//! Append-only conversation transcript.
//!
//! Turns are appended in `Pending` state the moment they are submitted and
//! settled in place once the external call resolves. Settlement pairs with a
//! turn through its [`TurnId`], never through "the last pending turn", so
//! interleaved turns cannot corrupt each other.

/// Stable handle for one turn. Outcome delivery closes over this, not over
/// any ambient "current turn" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(u64);

/// Where an utterance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceSource {
    Typed,
    Voice,
}

/// Lifecycle of a turn's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseState {
    Pending,
    /// Display-ready reply text (already formatted).
    Resolved(String),
    /// Failure reason, kept for logs; the displayed reply is the fixed
    /// apology, not this string.
    Failed(String),
}

/// One request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub id: TurnId,
    pub utterance: String,
    pub source: UtteranceSource,
    pub response: ResponseState,
}

impl Turn {
    pub fn is_settled(&self) -> bool {
        !matches!(self.response, ResponseState::Pending)
    }
}

/// Ordered, append-only sequence of turns plus their transient pending
/// markers. Entries are never removed or reordered; only `response` mutates.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    markers: Vec<TurnId>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new turn in `Pending` state together with its marker.
    pub fn append_pending(&mut self, utterance: &str, source: UtteranceSource) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        self.turns.push(Turn {
            id,
            utterance: utterance.to_string(),
            source,
            response: ResponseState::Pending,
        });
        self.markers.push(id);
        id
    }

    /// Settle a pending turn as resolved. Removes the marker; returns false
    /// if the turn is unknown or already settled.
    pub fn resolve(&mut self, id: TurnId, reply: String) -> bool {
        self.settle(id, ResponseState::Resolved(reply))
    }

    /// Settle a pending turn as failed. Removes the marker; returns false if
    /// the turn is unknown or already settled.
    pub fn fail(&mut self, id: TurnId, reason: String) -> bool {
        self.settle(id, ResponseState::Failed(reason))
    }

    fn settle(&mut self, id: TurnId, state: ResponseState) -> bool {
        let Some(turn) = self.turns.iter_mut().find(|turn| turn.id == id) else {
            return false;
        };
        if turn.is_settled() {
            return false;
        }
        turn.response = state;
        self.markers.retain(|marker| *marker != id);
        true
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id == id)
    }

    /// Whether the typing indicator for this turn is still showing.
    pub fn marker_visible(&self, id: TurnId) -> bool {
        self.markers.contains(&id)
    }

    pub fn pending_markers(&self) -> &[TurnId] {
        &self.markers
    }
}
