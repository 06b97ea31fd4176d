//! Request epochs for discarding stale responses
//!
//! Every list request takes a ticket when it starts. When its response
//! arrives, it is only applied if no newer request has started since.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RequestEpoch {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpochTicket(u64);

impl RequestEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> EpochTicket {
        EpochTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: EpochTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let epoch = RequestEpoch::new();
        let first = epoch.begin();
        assert!(epoch.is_current(first));

        let second = epoch.begin();
        assert!(second > first);
        assert!(!epoch.is_current(first));
        assert!(epoch.is_current(second));
    }
}
