use anyhow::{bail, Context, Result};
use lumi_contracts::conversation::SourceLink;
use lumi_contracts::media::InlineImage;
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Map, Value};

use super::{GenerateRequest, GenerateResponse, ModelTransport, Part};
use crate::config::GatewayConfig;
use crate::keys::ApiKeySlot;

/// `generateContent` over HTTPS. One attempt per call.
pub struct GeminiTransport {
    api_base: String,
    api_key: ApiKeySlot,
    http: HttpClient,
}

impl GeminiTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        // The blocking client defaults to a 30s timeout; `None` disables it.
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

impl ModelTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let Some(api_key) = self.api_key.get() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY or API_KEY not set");
        };
        let endpoint = self.endpoint_for_model(&request.model);
        let payload = build_payload(request);
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key.as_str())])
            .json(&payload)
            .send()
            .with_context(|| format!("Gemini request failed ({})", request.model))?;
        let response_payload = response_json_or_error("Gemini", response)?;
        parse_response(&response_payload)
    }

    fn fetch_image(&self, url: &str) -> Result<InlineImage> {
        let response = self
            .http
            .get(url)
            .send()
            .with_context(|| format!("image download failed ({url})"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("image download failed ({}): {url}", status.as_u16());
        }
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
            .filter(|value| value.starts_with("image/"))
            .unwrap_or_else(|| "image/jpeg".to_string());
        let bytes = response.bytes().context("image body read failed")?;
        if bytes.is_empty() {
            bail!("image download returned no bytes: {url}");
        }
        Ok(InlineImage::from_bytes(mime_type, &bytes))
    }
}

fn part_to_json(part: &Part) -> Value {
    match part {
        Part::Text(text) => json!({ "text": text }),
        Part::Image(image) => json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": image.data,
            }
        }),
    }
}

pub(crate) fn build_payload(request: &GenerateRequest) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "contents".to_string(),
        Value::Array(
            request
                .contents
                .iter()
                .map(|content| {
                    json!({
                        "role": content.role.as_str(),
                        "parts": content.parts.iter().map(part_to_json).collect::<Vec<_>>(),
                    })
                })
                .collect(),
        ),
    );
    if let Some(instruction) = request.system_instruction.as_ref() {
        payload.insert(
            "systemInstruction".to_string(),
            json!({ "parts": [{ "text": instruction }] }),
        );
    }

    let mut generation_config = Map::new();
    if let Some(mime) = request.response_mime_type.as_ref() {
        generation_config.insert("responseMimeType".to_string(), Value::String(mime.clone()));
    }
    if let Some(schema) = request.response_schema.as_ref() {
        generation_config.insert("responseSchema".to_string(), schema.clone());
    }
    if let Some(temperature) = request.temperature {
        generation_config.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(image_config) = request.image_config.as_ref() {
        let mut config = Map::new();
        config.insert(
            "aspectRatio".to_string(),
            Value::String(image_config.aspect_ratio.clone()),
        );
        if let Some(size) = image_config.image_size {
            config.insert("imageSize".to_string(), Value::String(size.as_str().to_string()));
        }
        generation_config.insert("imageConfig".to_string(), Value::Object(config));
    }
    if !generation_config.is_empty() {
        payload.insert(
            "generationConfig".to_string(),
            Value::Object(generation_config),
        );
    }
    if request.google_search {
        payload.insert("tools".to_string(), json!([{ "googleSearch": {} }]));
    }
    Value::Object(payload)
}

/// Reads the first candidate: visible text, inline images and search sources.
pub(crate) fn parse_response(payload: &Value) -> Result<GenerateResponse> {
    let Some(candidate) = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
    else {
        let reason = payload
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(Value::as_str)
            .unwrap_or("no candidates");
        bail!("Gemini returned no candidates ({reason})");
    };

    let parts = candidate
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut texts = Vec::new();
    let mut images = Vec::new();
    for part in &parts {
        let is_thought = part.get("thought").and_then(Value::as_bool).unwrap_or(false);
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            if !is_thought {
                texts.push(text.to_string());
            }
            continue;
        }
        let inline = part
            .get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(Value::as_object);
        let Some(inline) = inline else {
            continue;
        };
        let data = inline.get("data").and_then(Value::as_str).unwrap_or_default();
        if data.is_empty() {
            continue;
        }
        let mime_type = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        images.push(InlineImage::new(mime_type, data));
    }

    let sources = candidate
        .get("groundingMetadata")
        .and_then(|metadata| metadata.get("groundingChunks"))
        .and_then(Value::as_array)
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| chunk.get("web"))
                .filter_map(|web| {
                    let uri = web.get("uri").and_then(Value::as_str)?.trim();
                    if uri.is_empty() {
                        return None;
                    }
                    Some(SourceLink {
                        uri: uri.to_string(),
                        title: web.get("title").and_then(Value::as_str).map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GenerateResponse {
        text: if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        },
        images,
        sources,
    })
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
