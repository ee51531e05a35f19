//! Deferred selection reads.
//!
//! After a double activation (double-click) the host may not have settled
//! the selection yet, so the read is scheduled a short delay later. Any
//! newer selection event cancels the pending read. The embedder owns the
//! clock and calls [`DeferredRead::poll`]; nothing here spawns a timer.

use web_time::{Duration, Instant};

/// Default delay before reading the selection after a double activation.
pub const DEFAULT_DOUBLE_CLICK_DELAY: Duration = Duration::from_millis(10);

/// Handle for a scheduled read. Stale once a newer read is scheduled or
/// the pending one is cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadTicket(u64);

/// A single cancellable pending read.
#[derive(Clone, Debug)]
pub struct DeferredRead {
    delay: Duration,
    generation: u64,
    due: Option<Instant>,
}

impl Default for DeferredRead {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_DELAY)
    }
}

impl DeferredRead {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            due: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a read `delay` after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: Instant) -> ReadTicket {
        self.generation += 1;
        self.due = Some(now + self.delay);
        tracing::trace!(
            target: "weaver::inline::schedule",
            generation = self.generation,
            delay_ms = self.delay.as_millis() as u64,
            "scheduled selection read"
        );
        ReadTicket(self.generation)
    }

    /// Drop the pending read, if any.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.due.take().is_some();
        if was_pending {
            self.generation += 1;
            tracing::trace!(
                target: "weaver::inline::schedule",
                generation = self.generation,
                "cancelled selection read"
            );
        }
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Whether `ticket` still refers to the pending read.
    pub fn is_current(&self, ticket: ReadTicket) -> bool {
        self.due.is_some() && ticket.0 == self.generation
    }

    /// Fire the pending read if it is due. Returns true at most once per
    /// scheduled read.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
