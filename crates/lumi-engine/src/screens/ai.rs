use std::fmt;
use std::str::FromStr;

use lumi_contracts::conversation::{Message, Role, SourceLink, Transcript};
use lumi_contracts::media::InlineImage;

use super::{card, ProductCard};
use crate::gateway::Gateway;
use crate::generation::{RequestGate, Ticket};
use crate::keys::KeySelector;
use crate::stylist::StylistSession;
use crate::transport::ImageSize;

pub const GREETING: &str = "Bonjour. I am Lumi. How shall we elevate your style today? Use the modes below for specialized assistance.";
pub const STUDIO_READY: &str = "Here is your high-end studio concept.";
pub const STUDIO_FAILED: &str = "Studio generation failed. Please check your Pro API key.";
pub const ANALYZE_NEEDS_PHOTO: &str = "Attach a photo and I will study the piece for you.";
pub const NEEDS_WORDS: &str = "Add a few words so I know what you have in mind.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiMode {
    #[default]
    Chat,
    Search,
    Studio,
    Analyze,
}

impl AiMode {
    pub const ALL: [AiMode; 4] = [AiMode::Chat, AiMode::Search, AiMode::Studio, AiMode::Analyze];

    pub fn label(self) -> &'static str {
        match self {
            AiMode::Chat => "Chat",
            AiMode::Search => "Search",
            AiMode::Studio => "Studio",
            AiMode::Analyze => "Analyze",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            AiMode::Chat => "Talk to Lumi...",
            AiMode::Search => "Search current trends...",
            AiMode::Studio => "Describe a studio concept...",
            AiMode::Analyze => "Upload photo to analyze...",
        }
    }
}

impl fmt::Display for AiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AiMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        AiMode::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| format!("Unknown mode '{}'; use chat, search, studio or analyze.", raw.trim()))
    }
}

/// Remote (or local) work for one submitted turn.
pub enum AiJob {
    Chat {
        session: StylistSession,
        text: String,
    },
    Search {
        gateway: Gateway,
        query: String,
    },
    Studio {
        gateway: Gateway,
        prompt: String,
        source: Option<InlineImage>,
        size: ImageSize,
    },
    Analyze {
        gateway: Gateway,
        image: InlineImage,
    },
    Local(String),
}

impl AiJob {
    pub fn is_remote(&self) -> bool {
        !matches!(self, AiJob::Local(_))
    }

    pub fn run(self) -> Message {
        match self {
            AiJob::Chat { session, text } => {
                let reply = session.send_turn(&text).into_value();
                Message::assistant(reply.text).with_suggestions(reply.suggested_product_ids)
            }
            AiJob::Search { gateway, query } => {
                let advice = gateway.grounded_advice(&query).into_value();
                Message::assistant(advice.text).with_links(advice.links)
            }
            AiJob::Studio {
                gateway,
                prompt,
                source,
                size,
            } => {
                let generated = match source.as_ref() {
                    Some(image) => gateway.edit_image(image, &prompt, size),
                    None => gateway.studio_image(&prompt, size),
                };
                match generated.into_value() {
                    Some(image) => Message::assistant(STUDIO_READY).with_image(Some(image)),
                    None => Message::assistant(STUDIO_FAILED),
                }
            }
            AiJob::Analyze { gateway, image } => Message::assistant(gateway.analyze(&image).into_value()),
            AiJob::Local(text) => Message::assistant(text),
        }
    }
}

pub struct PendingTurn {
    ticket: Ticket,
    job: AiJob,
}

impl PendingTurn {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn job(&self) -> &AiJob {
        &self.job
    }

    pub fn run(self) -> (Ticket, Message) {
        (self.ticket, self.job.run())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMessageView {
    pub role: Role,
    pub text: String,
    pub image: Option<InlineImage>,
    pub links: Vec<SourceLink>,
    pub products: Vec<ProductCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiView {
    pub mode: AiMode,
    pub placeholder: &'static str,
    pub messages: Vec<AiMessageView>,
    pub loading: bool,
    pub attachment: Option<String>,
    /// Only shown in studio mode.
    pub image_size: Option<ImageSize>,
    pub can_send: bool,
}

pub struct AiScreen {
    gateway: Gateway,
    session: StylistSession,
    mode: AiMode,
    transcript: Transcript,
    input: String,
    attachment: Option<InlineImage>,
    image_size: ImageSize,
    gate: RequestGate,
}

impl AiScreen {
    /// Every mount opens a fresh stylist session.
    pub fn new(gateway: Gateway) -> Self {
        let session = gateway.start_stylist_session();
        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(GREETING));
        Self {
            gateway,
            session,
            mode: AiMode::Chat,
            transcript,
            input: String::new(),
            attachment: None,
            image_size: ImageSize::default(),
            gate: RequestGate::new(),
        }
    }

    pub fn mode(&self) -> AiMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AiMode) {
        self.mode = mode;
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn attach_image(&mut self, image: InlineImage) {
        self.attachment = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.attachment = None;
    }

    pub fn set_image_size(&mut self, size: ImageSize) {
        self.image_size = size;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.gate.in_flight()
    }

    pub fn session(&self) -> &StylistSession {
        &self.session
    }

    fn can_send(&self) -> bool {
        !self.gate.in_flight() && (!self.input.trim().is_empty() || self.attachment.is_some())
    }

    /// Takes the composed turn. Returns `None` while a reply is pending or
    /// when there is nothing to send.
    pub fn begin_submit(&mut self, keys: &mut dyn KeySelector) -> Option<PendingTurn> {
        if !self.can_send() {
            return None;
        }
        let text = self.input.trim().to_string();
        let attachment = self.attachment.take();
        self.input.clear();
        self.transcript
            .push(Message::user(text.clone()).with_image(attachment.clone()));

        let job = match (self.mode, attachment) {
            (AiMode::Analyze, Some(image)) => AiJob::Analyze {
                gateway: self.gateway.clone(),
                image,
            },
            (AiMode::Analyze, None) => AiJob::Local(ANALYZE_NEEDS_PHOTO.to_string()),
            (_, _) if text.is_empty() => AiJob::Local(NEEDS_WORDS.to_string()),
            (AiMode::Search, _) => AiJob::Search {
                gateway: self.gateway.clone(),
                query: text,
            },
            (AiMode::Studio, source) => {
                let key_ready = keys.has_selected_key() || keys.open_select_key().is_ok();
                if key_ready {
                    AiJob::Studio {
                        gateway: self.gateway.clone(),
                        prompt: text,
                        source,
                        size: self.image_size,
                    }
                } else {
                    AiJob::Local(STUDIO_FAILED.to_string())
                }
            }
            (AiMode::Chat, _) => AiJob::Chat {
                session: self.session.clone(),
                text,
            },
        };
        Some(PendingTurn {
            ticket: self.gate.begin(),
            job,
        })
    }

    pub fn finish_submit(&mut self, ticket: Ticket, message: Message) -> bool {
        if !self.gate.finish(ticket) {
            return false;
        }
        self.transcript.push(message);
        true
    }

    pub fn run_submit(&mut self, keys: &mut dyn KeySelector) -> bool {
        let Some(turn) = self.begin_submit(keys) else {
            return false;
        };
        let (ticket, message) = turn.run();
        self.finish_submit(ticket, message)
    }

    pub fn suggested_products(&self, message: &Message) -> Vec<ProductCard> {
        self.gateway
            .catalog()
            .by_ids(&message.suggested_product_ids)
            .iter()
            .map(card)
            .collect()
    }

    /// Whether any reply in this transcript offered `product_id`.
    pub fn suggests(&self, product_id: &str) -> bool {
        self.transcript
            .messages()
            .iter()
            .any(|message| message.suggested_product_ids.iter().any(|id| id == product_id))
    }

    pub fn view(&self) -> AiView {
        AiView {
            mode: self.mode,
            placeholder: self.mode.placeholder(),
            messages: self
                .transcript
                .messages()
                .iter()
                .map(|message| AiMessageView {
                    role: message.role,
                    text: message.text.clone(),
                    image: message.image.clone(),
                    links: message.links.clone(),
                    products: self.suggested_products(message),
                })
                .collect(),
            loading: self.gate.in_flight(),
            attachment: self.attachment.as_ref().map(|image| image.mime_type.clone()),
            image_size: (self.mode == AiMode::Studio).then_some(self.image_size),
            can_send: self.can_send(),
        }
    }
}
