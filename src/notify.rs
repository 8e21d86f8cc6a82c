//! Transient user-facing notices with auto-dismiss
//!
//! One slot, last write wins. A `show` re-arms the fixed dismissal timer,
//! so an earlier notice's timer can never hide a later one. The run loop
//! drives expiry off `deadline`.

use std::time::Duration;
use tokio::time::Instant;

/// How long a notice stays up unless superseded.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

/// Holds the currently displayed notice, if any.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Notice>,
    expires_at: Option<Instant>,
    seq: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is shown and re-arm the dismissal timer.
    pub fn show(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.current = Some(Notice {
            text: text.into(),
            kind,
        });
        self.expires_at = Some(Instant::now() + NOTICE_TTL);
        self.seq += 1;
    }

    /// Hide immediately and disarm the timer.
    pub fn clear(&mut self) {
        self.current = None;
        self.expires_at = None;
    }

    /// Called by the run loop when the armed deadline fires.
    pub fn expire(&mut self) {
        self.clear();
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// When the current notice should auto-clear. None while nothing is
    /// shown.
    pub fn deadline(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Monotonic counter bumped on every `show`; lets the renderer print
    /// each notice exactly once.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}
