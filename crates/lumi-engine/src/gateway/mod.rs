mod outcome;
pub(crate) mod prompts;
pub(crate) mod replies;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use lumi_contracts::catalog::{Catalog, Category};
use lumi_contracts::conversation::SourceLink;
use lumi_contracts::events::EventKind;
use lumi_contracts::media::InlineImage;
use lumi_contracts::models::{Capability, ModelSelector};
use serde_json::json;

use crate::config::GatewayConfig;
use crate::events::EventSink;
use crate::stylist::StylistSession;
use crate::transport::{GeminiTransport, GenerateResponse, ImageSize, ModelTransport};

pub use outcome::Outcome;

pub const ANALYZE_FALLBACK: &str = "Could not analyze the image at this time.";
pub const TRENDS_FALLBACK: &str =
    "Trend data is currently unavailable. Stick to timeless minimal classics.";
pub const ADVICE_FALLBACK: &str = "Elegance is the only beauty that never fades.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pose {
    #[default]
    Front,
    Left,
    Right,
    Back,
}

impl Pose {
    pub const ALL: [Pose; 4] = [Pose::Front, Pose::Left, Pose::Right, Pose::Back];

    pub fn as_str(self) -> &'static str {
        match self {
            Pose::Front => "Front",
            Pose::Left => "Left",
            Pose::Right => "Right",
            Pose::Back => "Back",
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pose {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Pose::ALL
            .into_iter()
            .find(|pose| pose.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| format!("Unknown pose '{}'; use front, left, right or back.", raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitCheckRequest {
    pub product_name: String,
    pub product_image: Option<InlineImage>,
    pub user_photo: Option<InlineImage>,
    pub color: Option<String>,
    pub pose: Pose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedAdvice {
    pub text: String,
    pub links: Vec<SourceLink>,
}

/// Stateless entry points to the hosted model, one per capability.
///
/// Every call is a fresh round-trip. Failures of any kind come back as
/// [`Outcome::Fallback`] carrying the documented fallback value.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn ModelTransport>,
    catalog: Arc<Catalog>,
    selector: ModelSelector,
    model_overrides: BTreeMap<Capability, String>,
    events: EventSink,
}

impl Gateway {
    pub fn new(transport: Arc<dyn ModelTransport>, catalog: Arc<Catalog>) -> Self {
        Self {
            transport,
            catalog,
            selector: ModelSelector::default(),
            model_overrides: BTreeMap::new(),
            events: EventSink::disabled(),
        }
    }

    pub fn from_config(config: &GatewayConfig, catalog: Arc<Catalog>) -> Result<Self> {
        let transport = GeminiTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), catalog).with_model_overrides(config.model_overrides.clone()))
    }

    pub fn with_model_overrides(mut self, overrides: BTreeMap<Capability, String>) -> Self {
        self.model_overrides = overrides;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub(crate) fn transport(&self) -> &dyn ModelTransport {
        self.transport.as_ref()
    }

    pub(crate) fn model_for(&self, capability: Capability) -> Result<String, String> {
        let requested = self.model_overrides.get(&capability).map(String::as_str);
        let selection = self.selector.select(requested, capability)?;
        if let Some(reason) = selection.fallback_reason.as_ref() {
            self.events.emit(
                EventKind::ModelFallback,
                json!({
                    "capability": capability.as_str(),
                    "requested": selection.requested,
                    "model": selection.model.name,
                    "reason": reason,
                }),
            );
        }
        Ok(selection.model.name)
    }

    pub(crate) fn record<T>(&self, capability: Capability, model: &str, outcome: &Outcome<T>) {
        self.events.emit(
            EventKind::GatewayCall,
            json!({
                "capability": capability.as_str(),
                "model": model,
                "transport": self.transport.name(),
                "status": if outcome.is_fallback() { "fallback" } else { "ok" },
                "reason": outcome.reason(),
            }),
        );
    }

    fn invoke<T>(
        &self,
        capability: Capability,
        fallback: impl FnOnce() -> T,
        call: impl FnOnce(&str) -> Result<T>,
    ) -> Outcome<T> {
        let model = match self.model_for(capability) {
            Ok(model) => model,
            Err(reason) => {
                let outcome = Outcome::fallback(fallback(), reason);
                self.record(capability, "", &outcome);
                return outcome;
            }
        };
        let outcome = match call(&model) {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::fallback(fallback(), format!("{err:#}")),
        };
        self.record(capability, &model, &outcome);
        outcome
    }

    fn first_image(response: GenerateResponse) -> Result<Option<InlineImage>> {
        match response.images.into_iter().next() {
            Some(image) => Ok(Some(image)),
            None => anyhow::bail!("model returned no image"),
        }
    }

    /// Product ids from `category` that suit the person in `photo`. A
    /// successful empty list is passed through for the caller to handle.
    pub fn recommend(&self, photo: &InlineImage, category: Category) -> Outcome<Vec<String>> {
        let products = self.catalog.in_category(category);
        let fallback_ids: Vec<String> = products.iter().map(|product| product.id.clone()).collect();
        self.invoke(
            Capability::Recommend,
            || fallback_ids,
            |model| {
                let request = prompts::recommend(model, photo, category, &products);
                replies::parse_id_list(&self.transport.generate(&request)?)
            },
        )
    }

    pub fn analyze(&self, image: &InlineImage) -> Outcome<String> {
        self.invoke(
            Capability::Analyze,
            || ANALYZE_FALLBACK.to_string(),
            |model| replies::required_text(&self.transport.generate(&prompts::analyze(model, image))?),
        )
    }

    pub fn grounded_advice(&self, query: &str) -> Outcome<GroundedAdvice> {
        self.invoke(
            Capability::GroundedSearch,
            || GroundedAdvice {
                text: TRENDS_FALLBACK.to_string(),
                links: Vec::new(),
            },
            |model| {
                let response = self
                    .transport
                    .generate(&prompts::grounded_advice(model, query))?;
                Ok(GroundedAdvice {
                    text: replies::required_text(&response)?,
                    links: response.sources,
                })
            },
        )
    }

    pub fn studio_image(&self, prompt: &str, size: ImageSize) -> Outcome<Option<InlineImage>> {
        self.invoke(
            Capability::StudioImage,
            || None,
            |model| {
                Self::first_image(
                    self.transport
                        .generate(&prompts::studio_image(model, prompt, size))?,
                )
            },
        )
    }

    pub fn edit_image(
        &self,
        image: &InlineImage,
        instruction: &str,
        size: ImageSize,
    ) -> Outcome<Option<InlineImage>> {
        self.invoke(
            Capability::ImageEdit,
            || None,
            |model| {
                Self::first_image(
                    self.transport
                        .generate(&prompts::edit_image(model, image, instruction, size))?,
                )
            },
        )
    }

    pub fn fit_check(&self, request: &FitCheckRequest) -> Outcome<Option<InlineImage>> {
        self.invoke(
            Capability::FitCheck,
            || None,
            |model| Self::first_image(self.transport.generate(&prompts::fit_check(model, request))?),
        )
    }

    pub fn fashion_advice(&self, occasion: &str) -> Outcome<String> {
        self.invoke(
            Capability::Advice,
            || ADVICE_FALLBACK.to_string(),
            |model| {
                replies::required_text(
                    &self
                        .transport
                        .generate(&prompts::fashion_advice(model, occasion))?,
                )
            },
        )
    }

    /// Product photo for fit checks; an unreachable image is simply omitted.
    pub fn fetch_product_image(&self, url: &str) -> Option<InlineImage> {
        if url.trim().is_empty() {
            return None;
        }
        match self.transport.fetch_image(url) {
            Ok(image) => Some(image),
            Err(err) => {
                self.events.emit(
                    EventKind::ProductImageUnavailable,
                    json!({ "url": url, "reason": format!("{err:#}") }),
                );
                None
            }
        }
    }

    pub fn start_stylist_session(&self) -> StylistSession {
        StylistSession::new(self.clone())
    }
}
