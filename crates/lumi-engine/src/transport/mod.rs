mod dryrun;
mod gemini;
#[cfg(test)]
pub(crate) mod scripted;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use lumi_contracts::conversation::SourceLink;
use lumi_contracts::media::InlineImage;
use serde_json::Value;

pub use dryrun::DryrunTransport;
pub use gemini::GeminiTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Image(InlineImage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRole {
    User,
    Model,
}

impl ContentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentRole::User => "user",
            ContentRole::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: ContentRole::User,
            parts,
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: ContentRole::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    OneK,
    TwoK,
    FourK,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::OneK, ImageSize::TwoK, ImageSize::FourK];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageSize::OneK),
            "2K" => Ok(ImageSize::TwoK),
            "4K" => Ok(ImageSize::FourK),
            other => Err(format!("Unknown image size '{other}'; use 1K, 2K or 4K.")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: Option<ImageSize>,
}

/// One `generateContent` call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
    pub google_search: bool,
    pub image_config: Option<ImageConfig>,
    pub temperature: Option<f64>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            response_mime_type: None,
            response_schema: None,
            google_search: false,
            image_config: None,
            temperature: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self.response_schema = Some(schema);
        self
    }

    pub fn with_google_search(mut self) -> Self {
        self.google_search = true;
        self
    }

    pub fn with_image_config(mut self, aspect_ratio: &str, image_size: Option<ImageSize>) -> Self {
        self.image_config = Some(ImageConfig {
            aspect_ratio: aspect_ratio.to_string(),
            image_size,
        });
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text of the final user turn, which carries the capability prompt.
    pub fn prompt_text(&self) -> String {
        self.contents
            .iter()
            .rev()
            .find(|content| content.role == ContentRole::User)
            .map(Content::text)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub images: Vec<InlineImage>,
    pub sources: Vec<SourceLink>,
}

pub trait ModelTransport: Send + Sync {
    fn name(&self) -> &str;
    fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
    fn fetch_image(&self, url: &str) -> Result<InlineImage>;
}

#[cfg(test)]
mod tests {
    use super::{Content, GenerateRequest, ImageSize, Part};

    #[test]
    fn image_size_parses_case_insensitively() {
        assert_eq!("2k".parse::<ImageSize>(), Ok(ImageSize::TwoK));
        assert_eq!(ImageSize::default().as_str(), "1K");
        assert!("8K".parse::<ImageSize>().is_err());
    }

    #[test]
    fn prompt_text_reads_last_user_turn() {
        let request = GenerateRequest::new(
            "m",
            vec![
                Content::user(vec![Part::Text("first".to_string())]),
                Content::model_text("reply"),
                Content::user(vec![Part::Text("second".to_string())]),
            ],
        );
        assert_eq!(request.prompt_text(), "second");
    }
}
