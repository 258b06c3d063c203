use std::time::Duration;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Handle for one scheduled commit. Only the most recent ticket may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// Collapses a burst of search edits into one committed value.
///
/// The caller owns the timer: `schedule` hands back a ticket, the caller
/// waits [`SearchDebouncer::delay`] and then calls `fire`. Scheduling again
/// or cancelling voids every earlier ticket, so at most one commit is ever
/// pending.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: u64,
    pending: Option<String>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, value: String) -> DebounceTicket {
        self.generation += 1;
        self.pending = Some(value);
        DebounceTicket(self.generation)
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    /// Returns the value to commit if `ticket` is still the live one.
    pub fn fire(&mut self, ticket: DebounceTicket) -> Option<String> {
        if ticket.0 != self.generation {
            return None;
        }
        self.pending.take()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}
