use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lumi_contracts::media::InlineImage;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::{GenerateRequest, GenerateResponse, ModelTransport};

const DRYRUN_WIDTH: u32 = 96;
const DRYRUN_HEIGHT: u32 = 128;

/// Offline transport: canned text shaped to the requested schema and
/// solid-colour images derived from the prompt.
#[derive(Debug, Clone, Default)]
pub struct DryrunTransport;

impl DryrunTransport {
    pub fn new() -> Self {
        Self
    }
}

impl ModelTransport for DryrunTransport {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let prompt = request.prompt_text();
        if request.image_config.is_some() {
            let image = solid_png(&prompt, DRYRUN_WIDTH, DRYRUN_HEIGHT)?;
            return Ok(GenerateResponse {
                text: None,
                images: vec![image],
                sources: Vec::new(),
            });
        }

        let text = match request.response_schema.as_ref() {
            Some(schema) => canned_json(schema, request).to_string(),
            None => format!(
                "[dryrun {}] {}",
                short_id(&prompt),
                clamp_text(&prompt, 120)
            ),
        };
        Ok(GenerateResponse {
            text: Some(text),
            images: Vec::new(),
            sources: Vec::new(),
        })
    }

    fn fetch_image(&self, url: &str) -> Result<InlineImage> {
        solid_png(url, 16, 16)
    }
}

/// Product ids mentioned as `ID: <id>` in the prompt or system instruction.
fn mentioned_ids(request: &GenerateRequest) -> Vec<String> {
    let mut haystack = request.prompt_text();
    if let Some(instruction) = request.system_instruction.as_ref() {
        haystack.push('\n');
        haystack.push_str(instruction);
    }
    haystack
        .split("ID: ")
        .skip(1)
        .filter_map(|tail| {
            let id: String = tail
                .chars()
                .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
                .collect();
            (!id.is_empty()).then_some(id)
        })
        .collect()
}

fn canned_json(schema: &Value, request: &GenerateRequest) -> Value {
    let ids = mentioned_ids(request);
    match schema.get("type").and_then(Value::as_str) {
        Some("ARRAY") => json!(ids.into_iter().take(1).collect::<Vec<_>>()),
        Some("OBJECT") => json!({
            "text": format!("[dryrun] {}", clamp_text(&request.prompt_text(), 80)),
            "suggestedProductIds": ids.into_iter().take(1).collect::<Vec<_>>(),
        }),
        _ => Value::Null,
    }
}

fn solid_png(seed: &str, width: u32, height: u32) -> Result<InlineImage> {
    let (r, g, b) = color_from_prompt(seed);
    let mut image = RgbImage::new(width, height);
    for pixel in image.pixels_mut() {
        *pixel = Rgb([r, g, b]);
    }
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("dryrun image encode failed")?;
    Ok(InlineImage::from_bytes("image/png", &bytes))
}

fn color_from_prompt(prompt: &str) -> (u8, u8, u8) {
    let digest = Sha256::digest(prompt.as_bytes());
    (digest[0], digest[1], digest[2])
}

fn short_id(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(&digest[..4])
}

fn clamp_text(text: &str, max_chars: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    flattened.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::DryrunTransport;
    use crate::transport::{Content, GenerateRequest, ModelTransport, Part};

    fn request(text: &str) -> GenerateRequest {
        GenerateRequest::new("dryrun-1", vec![Content::user(vec![Part::Text(text.to_string())])])
    }

    #[test]
    fn image_requests_return_decodable_png() -> anyhow::Result<()> {
        let response = DryrunTransport::new()
            .generate(&request("studio shot").with_image_config("3:4", None))?;
        assert_eq!(response.images.len(), 1);
        let bytes = response.images[0].decode()?;
        let decoded = image::load_from_memory(&bytes)?;
        assert_eq!((decoded.width(), decoded.height()), (96, 128));
        Ok(())
    }

    #[test]
    fn same_prompt_gives_same_image() -> anyhow::Result<()> {
        let transport = DryrunTransport::new();
        let a = transport.generate(&request("x").with_image_config("3:4", None))?;
        let b = transport.generate(&request("x").with_image_config("3:4", None))?;
        assert_eq!(a.images, b.images);
        Ok(())
    }

    #[test]
    fn array_schema_returns_first_listed_id() -> anyhow::Result<()> {
        let response = DryrunTransport::new().generate(
            &request("Products:\nID: h1, Name: Hoodie\nID: p1, Name: Pant")
                .with_json_schema(json!({"type": "ARRAY", "items": {"type": "STRING"}})),
        )?;
        let parsed: Value = serde_json::from_str(response.text.as_deref().unwrap_or("null"))?;
        assert_eq!(parsed, json!(["h1"]));
        Ok(())
    }

    #[test]
    fn object_schema_suggests_from_system_inventory() -> anyhow::Result<()> {
        let response = DryrunTransport::new().generate(
            &request("something for a date")
                .with_system_instruction("Inventory:\n- ID: j1, Name: Blazer")
                .with_json_schema(json!({"type": "OBJECT"})),
        )?;
        let parsed: Value = serde_json::from_str(response.text.as_deref().unwrap_or("null"))?;
        assert_eq!(parsed["suggestedProductIds"], json!(["j1"]));
        assert!(parsed["text"].as_str().unwrap_or("").contains("something for a date"));
        Ok(())
    }
}
