use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one issued request. Only the newest ticket may apply results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Request-generation counter for a screen-local async flow.
///
/// Starting a request invalidates every earlier ticket, so a slow response
/// from a superseded request is dropped instead of overwriting newer state.
/// Ticket numbers are unique across all gates, so a freshly mounted screen
/// never accepts a result issued by the one it replaced.
#[derive(Debug, Default)]
pub struct RequestGate {
    current: Option<u64>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.current = Some(ticket);
        Ticket(ticket)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current == Some(ticket.0)
    }

    /// Returns whether the result for `ticket` may be applied.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.current = None;
        true
    }

    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }
}
