use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::stylist::StylistReply;
use crate::transport::GenerateResponse;

#[derive(Debug, Deserialize)]
struct RawStylistReply {
    text: String,
    #[serde(rename = "suggestedProductIds")]
    suggested_product_ids: Vec<String>,
}

/// Models sometimes wrap JSON answers in a markdown fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

pub(crate) fn required_text(response: &GenerateResponse) -> Result<String> {
    let text = response.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        bail!("model returned no text");
    }
    Ok(text.to_string())
}

pub(crate) fn parse_id_list(response: &GenerateResponse) -> Result<Vec<String>> {
    let text = required_text(response)?;
    let ids: Vec<String> = serde_json::from_str(strip_code_fence(&text))
        .context("recommendation reply is not a JSON array of strings")?;
    Ok(ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect())
}

pub(crate) fn parse_stylist_reply(response: &GenerateResponse) -> Result<StylistReply> {
    let text = required_text(response)?;
    let raw: RawStylistReply = serde_json::from_str(strip_code_fence(&text))
        .context("stylist reply does not match {text, suggestedProductIds}")?;
    if raw.text.trim().is_empty() {
        bail!("stylist reply text is empty");
    }
    Ok(StylistReply {
        text: raw.text,
        suggested_product_ids: raw.suggested_product_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_id_list, parse_stylist_reply, required_text};
    use crate::transport::GenerateResponse;

    fn text(body: &str) -> GenerateResponse {
        GenerateResponse {
            text: Some(body.to_string()),
            ..GenerateResponse::default()
        }
    }

    #[test]
    fn id_list_accepts_plain_and_fenced_arrays() -> anyhow::Result<()> {
        assert_eq!(parse_id_list(&text("[\"h1\", \" p1 \", \"\"]"))?, vec!["h1", "p1"]);
        assert_eq!(parse_id_list(&text("```json\n[\"t1\"]\n```"))?, vec!["t1"]);
        assert!(parse_id_list(&text("[]"))?.is_empty());
        Ok(())
    }

    #[test]
    fn id_list_rejects_wrong_shapes() {
        assert!(parse_id_list(&text("[1, 2]")).is_err());
        assert!(parse_id_list(&text("{\"ids\": []}")).is_err());
        assert!(parse_id_list(&GenerateResponse::default()).is_err());
    }

    #[test]
    fn stylist_reply_requires_both_fields() -> anyhow::Result<()> {
        let reply = parse_stylist_reply(&text(
            "{\"text\": \"Try the blazer.\", \"suggestedProductIds\": [\"j1\"]}",
        ))?;
        assert_eq!(reply.text, "Try the blazer.");
        assert_eq!(reply.suggested_product_ids, vec!["j1"]);

        assert!(parse_stylist_reply(&text("{\"text\": \"hi\"}")).is_err());
        assert!(parse_stylist_reply(&text("{\"text\": \"\", \"suggestedProductIds\": []}")).is_err());
        assert!(parse_stylist_reply(&text("not json")).is_err());
        Ok(())
    }

    #[test]
    fn blank_text_is_an_error() {
        assert!(required_text(&text("   ")).is_err());
    }
}
