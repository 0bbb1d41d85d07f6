use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use lumi_contracts::media::InlineImage;

use super::{GenerateRequest, GenerateResponse, ModelTransport};

/// Test transport replaying queued responses and recording every request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<GenerateResponse, String>>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    product_image: Option<InlineImage>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_product_image(mut self, image: InlineImage) -> Self {
        self.product_image = Some(image);
        self
    }

    pub(crate) fn push_text(&self, text: &str) -> &Self {
        self.push(Ok(GenerateResponse {
            text: Some(text.to_string()),
            ..GenerateResponse::default()
        }))
    }

    pub(crate) fn push_error(&self, message: &str) -> &Self {
        self.push(Err(message.to_string()))
    }

    pub(crate) fn push(&self, response: Result<GenerateResponse, String>) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
        self
    }

    pub(crate) fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ModelTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        let next = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted response left")),
        }
    }

    fn fetch_image(&self, url: &str) -> Result<InlineImage> {
        self.product_image
            .clone()
            .ok_or_else(|| anyhow!("no scripted image for {url}"))
    }
}
