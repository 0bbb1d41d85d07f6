use super::registry::{Capability, ModelRegistry, ModelSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_default(),
        }
    }

    /// Without a request the first capable model is used silently; an
    /// unusable request falls back to it with an explanation.
    pub fn select(
        &self,
        requested: Option<&str>,
        capability: Capability,
    ) -> Result<ModelSelection, String> {
        let (fallback_reason, requested_text) = if let Some(requested_value) = requested {
            if let Some(model) = self.registry.ensure(requested_value, capability) {
                return Ok(ModelSelection {
                    model,
                    requested: Some(requested_value.to_string()),
                    fallback_reason: None,
                });
            }
            (
                Some(format!(
                    "Requested model '{requested_value}' unavailable for capability '{capability}'."
                )),
                Some(requested_value.to_string()),
            )
        } else {
            (None, None)
        };

        let candidates = self.registry.by_capability(capability);
        let Some(model) = candidates.first().cloned() else {
            return Err(format!(
                "No models available for capability '{capability}'."
            ));
        };
        Ok(ModelSelection {
            model,
            requested: requested_text,
            fallback_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::models::{Capability, ModelRegistry, ModelSelector, ModelSpec};

    fn spec(name: &str, capabilities: &[Capability]) -> ModelSpec {
        ModelSpec {
            name: name.to_string(),
            provider: "dryrun".to_string(),
            capabilities: capabilities.to_vec(),
        }
    }

    #[test]
    fn selector_uses_default_without_request() -> Result<(), String> {
        let selection = ModelSelector::default().select(None, Capability::StudioImage)?;
        assert_eq!(selection.model.name, "gemini-3-pro-image-preview");
        assert_eq!(selection.fallback_reason, None);
        Ok(())
    }

    #[test]
    fn selector_honours_capable_request() -> Result<(), String> {
        let selection =
            ModelSelector::default().select(Some("dryrun-1"), Capability::StylistChat)?;
        assert_eq!(selection.model.name, "dryrun-1");
        assert_eq!(selection.requested.as_deref(), Some("dryrun-1"));
        assert!(selection.fallback_reason.is_none());
        Ok(())
    }

    #[test]
    fn selector_falls_back_when_request_lacks_capability() -> Result<(), String> {
        let selection = ModelSelector::default()
            .select(Some("gemini-2.5-flash-lite-latest"), Capability::FitCheck)?;
        assert_eq!(selection.model.name, "gemini-2.5-flash-image");
        assert_eq!(
            selection.fallback_reason.as_deref(),
            Some(
                "Requested model 'gemini-2.5-flash-lite-latest' unavailable for capability 'fit_check'."
            )
        );
        Ok(())
    }

    #[test]
    fn selector_errors_when_no_model_has_capability() {
        let mut models = IndexMap::new();
        models.insert("text-only".to_string(), spec("text-only", &[Capability::Advice]));
        let err = ModelSelector::new(Some(ModelRegistry::new(Some(models))))
            .select(Some("text-only"), Capability::StudioImage)
            .err()
            .unwrap_or_default();
        assert_eq!(err, "No models available for capability 'studio_image'.");
    }
}
