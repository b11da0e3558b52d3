//! Transient user notifications with a single visible slot.
//!
//! Newest always wins: raising a notification discards whatever is on screen
//! and re-arms the auto-dismiss deadline. Nothing is queued behind it.

use std::time::{Duration, Instant};

/// How long a notification stays visible unless superseded.
pub const NOTIFICATION_VISIBLE: Duration = Duration::from_secs(4);

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// One short-lived status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

/// Owns the single live notification and its dismiss deadline.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    live: Option<Notification>,
    clear_deadline: Option<Instant>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any visible notification and arm a fresh dismiss deadline.
    /// The superseded notification never reappears.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        self.live = Some(Notification {
            message: message.into(),
            severity,
            created_at: now,
        });
        self.clear_deadline = Some(now + NOTIFICATION_VISIBLE);
    }

    /// Dismiss the live notification once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.clear_deadline {
            if now >= deadline {
                self.live = None;
                self.clear_deadline = None;
            }
        }
    }

    /// Currently visible notification, if any.
    pub fn visible(&self) -> Option<&Notification> {
        self.live.as_ref()
    }
}
