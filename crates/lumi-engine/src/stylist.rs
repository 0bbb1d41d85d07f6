use std::sync::{Arc, Mutex};

use lumi_contracts::models::Capability;

use crate::gateway::{prompts, replies, Gateway, Outcome};
use crate::transport::{Content, GenerateRequest, Part};

pub const REPLY_FAILED: &str = "I apologize, something went wrong.";
pub const SERVICE_UNAVAILABLE: &str = "Service temporarily unavailable. Our artisans are working on it.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylistReply {
    pub text: String,
    pub suggested_product_ids: Vec<String>,
}

impl StylistReply {
    fn apology(text: &str) -> Self {
        Self {
            text: text.to_string(),
            suggested_product_ids: Vec::new(),
        }
    }
}

/// Multi-turn stylist conversation. Clones share one history, so a job
/// running off the UI thread appends to the same session.
#[derive(Clone)]
pub struct StylistSession {
    gateway: Gateway,
    instruction: String,
    history: Arc<Mutex<Vec<Content>>>,
}

impl StylistSession {
    pub(crate) fn new(gateway: Gateway) -> Self {
        let instruction = prompts::stylist_instruction(gateway.catalog());
        Self {
            gateway,
            instruction,
            history: Arc::default(),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn history(&self) -> Vec<Content> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Sends the whole history plus `text`. Only a well-formed reply extends
    /// the history.
    pub fn send_turn(&self, text: &str) -> Outcome<StylistReply> {
        let capability = Capability::StylistChat;
        let model = match self.gateway.model_for(capability) {
            Ok(model) => model,
            Err(reason) => {
                let outcome = Outcome::fallback(StylistReply::apology(SERVICE_UNAVAILABLE), reason);
                self.gateway.record(capability, "", &outcome);
                return outcome;
            }
        };

        let user_turn = Content::user(vec![Part::Text(text.to_string())]);
        let mut contents = self.history();
        contents.push(user_turn.clone());
        let request = GenerateRequest::new(&model, contents)
            .with_system_instruction(self.instruction.clone())
            .with_json_schema(prompts::stylist_reply_schema());

        let outcome = match self.gateway.transport().generate(&request) {
            Err(err) => Outcome::fallback(
                StylistReply::apology(SERVICE_UNAVAILABLE),
                format!("{err:#}"),
            ),
            Ok(response) => match replies::parse_stylist_reply(&response) {
                Ok(reply) => {
                    let raw = response.text.unwrap_or_default();
                    let mut history = self
                        .history
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    history.push(user_turn);
                    history.push(Content::model_text(raw));
                    Outcome::Success(reply)
                }
                Err(err) => Outcome::fallback(StylistReply::apology(REPLY_FAILED), format!("{err:#}")),
            },
        };
        self.gateway.record(capability, &model, &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lumi_contracts::catalog::Catalog;

    use super::{REPLY_FAILED, SERVICE_UNAVAILABLE};
    use crate::gateway::{Gateway, Outcome};
    use crate::stylist::StylistReply;
    use crate::transport::scripted::ScriptedTransport;
    use crate::transport::ContentRole;

    fn session(transport: &ScriptedTransport) -> super::StylistSession {
        Gateway::new(Arc::new(transport.clone()), Arc::new(Catalog::mock())).start_stylist_session()
    }

    #[test]
    fn successful_turns_accumulate_history() {
        let transport = ScriptedTransport::new();
        transport
            .push_text("{\"text\": \"A blazer would suit you.\", \"suggestedProductIds\": [\"j1\"]}")
            .push_text("{\"text\": \"Pair it with trousers.\", \"suggestedProductIds\": [\"p1\"]}");
        let session = session(&transport);

        let first = session.send_turn("Something for a gallery opening");
        assert_eq!(
            first,
            Outcome::Success(StylistReply {
                text: "A blazer would suit you.".to_string(),
                suggested_product_ids: vec!["j1".to_string()],
            })
        );
        session.send_turn("And below?");

        let requests = transport.requests();
        assert_eq!(requests[0].contents.len(), 1);
        assert_eq!(requests[1].contents.len(), 3);
        assert_eq!(requests[1].contents[1].role, ContentRole::Model);
        assert_eq!(requests[1].model, "gemini-3-flash-preview");
        assert!(requests[0]
            .system_instruction
            .as_deref()
            .is_some_and(|text| text.contains("Inventory:")));
        assert_eq!(session.history_len(), 4);
    }

    #[test]
    fn failures_apologise_and_leave_history_untouched() {
        let transport = ScriptedTransport::new();
        transport.push_text("not json").push_error("connection reset");
        let session = session(&transport);

        let malformed = session.send_turn("hello");
        assert!(malformed.is_fallback());
        assert_eq!(malformed.value().text, REPLY_FAILED);
        assert!(malformed.value().suggested_product_ids.is_empty());

        let offline = session.send_turn("hello again");
        assert_eq!(offline.value().text, SERVICE_UNAVAILABLE);
        assert_eq!(offline.reason(), Some("connection reset"));

        assert_eq!(session.history_len(), 0);
        assert_eq!(transport.requests()[1].contents.len(), 1);
    }

    #[test]
    fn clones_share_the_same_history() {
        let transport = ScriptedTransport::new();
        transport.push_text("{\"text\": \"Yes.\", \"suggestedProductIds\": []}");
        let session = session(&transport);
        let job_copy = session.clone();

        job_copy.send_turn("Does black suit me?");
        assert_eq!(session.history_len(), 2);
    }
}
