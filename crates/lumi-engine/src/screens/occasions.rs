use lumi_contracts::catalog::OCCASIONS;

use super::{card, ProductCard};
use crate::gateway::{Gateway, Outcome};
use crate::generation::{RequestGate, Ticket};

const SUGGESTION_COUNT: usize = 4;

pub struct OccasionJob {
    ticket: Ticket,
    gateway: Gateway,
    occasion: String,
}

impl OccasionJob {
    pub fn run(self) -> (Ticket, Outcome<String>) {
        (self.ticket, self.gateway.fashion_advice(&self.occasion))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccasionView {
    pub occasions: Vec<&'static str>,
    pub query: String,
    pub thinking: bool,
    pub note: Option<String>,
    pub suggestions: Vec<ProductCard>,
}

/// Quick styling notes for a named occasion.
pub struct OccasionBoard {
    gateway: Gateway,
    query: String,
    note: Option<String>,
    gate: RequestGate,
}

impl OccasionBoard {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            query: String::new(),
            note: None,
            gate: RequestGate::new(),
        }
    }

    pub fn begin_occasion(&mut self, occasion: &str) -> Option<OccasionJob> {
        let occasion = occasion.trim();
        if occasion.is_empty() {
            return None;
        }
        self.query = occasion.to_string();
        self.note = None;
        Some(OccasionJob {
            ticket: self.gate.begin(),
            gateway: self.gateway.clone(),
            occasion: self.query.clone(),
        })
    }

    pub fn finish_occasion(&mut self, ticket: Ticket, outcome: Outcome<String>) -> bool {
        if !self.gate.finish(ticket) {
            return false;
        }
        self.note = Some(outcome.into_value());
        true
    }

    pub fn run_occasion(&mut self, occasion: &str) -> bool {
        let Some(job) = self.begin_occasion(occasion) else {
            return false;
        };
        let (ticket, outcome) = job.run();
        self.finish_occasion(ticket, outcome)
    }

    pub fn view(&self) -> OccasionView {
        let suggestions = if self.query.is_empty() {
            Vec::new()
        } else {
            self.gateway
                .catalog()
                .products()
                .iter()
                .take(SUGGESTION_COUNT)
                .map(card)
                .collect()
        };
        OccasionView {
            occasions: OCCASIONS.to_vec(),
            query: self.query.clone(),
            thinking: self.gate.in_flight(),
            note: self.note.clone(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lumi_contracts::catalog::Catalog;

    use super::OccasionBoard;
    use crate::gateway::{Gateway, ADVICE_FALLBACK};
    use crate::transport::scripted::ScriptedTransport;

    fn board(transport: &ScriptedTransport) -> OccasionBoard {
        OccasionBoard::new(Gateway::new(
            Arc::new(transport.clone()),
            Arc::new(Catalog::mock()),
        ))
    }

    #[test]
    fn suggestions_appear_once_a_query_is_set() {
        let transport = ScriptedTransport::new();
        transport.push_text("Soft tailoring in charcoal.");
        let mut board = board(&transport);
        assert!(board.view().suggestions.is_empty());
        assert_eq!(board.view().occasions.len(), 7);
        assert!(board.begin_occasion("  ").is_none());

        assert!(board.run_occasion("Office wear"));
        let view = board.view();
        assert_eq!(view.query, "Office wear");
        assert_eq!(view.note.as_deref(), Some("Soft tailoring in charcoal."));
        assert_eq!(view.suggestions.len(), 4);
        assert_eq!(view.suggestions[0].id, "s1");
    }

    #[test]
    fn newer_occasion_wins_and_failures_use_the_fallback_note() {
        let transport = ScriptedTransport::new();
        transport.push_error("timeout");
        let mut board = board(&transport);

        let first = board.begin_occasion("Party wear").expect("job");
        let second = board.begin_occasion("Date outfit").expect("job");
        assert!(board.view().thinking);

        let (stale, outcome) = first.run();
        assert!(!board.finish_occasion(stale, outcome));
        let (ticket, outcome) = second.run();
        assert!(board.finish_occasion(ticket, outcome));
        assert_eq!(board.view().note.as_deref(), Some(ADVICE_FALLBACK));
        assert_eq!(board.view().query, "Date outfit");
    }
}
