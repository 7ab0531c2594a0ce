use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request tickets. Only the most recently issued ticket is
/// current, so a slow response to a superseded request can be dropped.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede every outstanding ticket without issuing a new request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
