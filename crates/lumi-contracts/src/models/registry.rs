use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// One entry per AI Gateway function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Recommend,
    Analyze,
    GroundedSearch,
    StudioImage,
    ImageEdit,
    FitCheck,
    StylistChat,
    Advice,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Recommend,
        Capability::Analyze,
        Capability::GroundedSearch,
        Capability::StudioImage,
        Capability::ImageEdit,
        Capability::FitCheck,
        Capability::StylistChat,
        Capability::Advice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Recommend => "recommend",
            Capability::Analyze => "analyze",
            Capability::GroundedSearch => "grounded_search",
            Capability::StudioImage => "studio_image",
            Capability::ImageEdit => "image_edit",
            Capability::FitCheck => "fit_check",
            Capability::StylistChat => "stylist_chat",
            Capability::Advice => "advice",
        }
    }

    /// Environment variable holding a model override, e.g. `LUMI_MODEL_FIT_CHECK`.
    pub fn env_key(self) -> String {
        format!("LUMI_MODEL_{}", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Capability::ALL
            .into_iter()
            .find(|capability| capability.as_str() == normalized)
            .ok_or_else(|| format!("Unknown capability '{}'.", raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<Capability>,
}

impl ModelSpec {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn by_capability(&self, capability: Capability) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: Capability) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if model.supports(capability) {
            return Some(model.clone());
        }
        None
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, provider: &str, capabilities: &[Capability]| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                provider: provider.to_string(),
                capabilities: capabilities.to_vec(),
            },
        );
    };

    insert(
        "gemini-3-pro-preview",
        "gemini",
        &[Capability::Recommend, Capability::Analyze],
    );
    insert(
        "gemini-3-flash-preview",
        "gemini",
        &[Capability::GroundedSearch, Capability::StylistChat],
    );
    insert(
        "gemini-3-pro-image-preview",
        "gemini",
        &[Capability::StudioImage],
    );
    insert(
        "gemini-2.5-flash-image",
        "gemini",
        &[Capability::FitCheck, Capability::ImageEdit],
    );
    insert(
        "gemini-2.5-flash-lite-latest",
        "gemini",
        &[Capability::Advice],
    );
    insert("dryrun-1", "dryrun", &Capability::ALL);

    map
}

#[cfg(test)]
mod tests {
    use super::{Capability, ModelRegistry};

    #[test]
    fn every_capability_has_a_gemini_default() {
        let registry = ModelRegistry::default();
        for capability in Capability::ALL {
            let models = registry.by_capability(capability);
            assert_eq!(
                models.first().map(|model| model.provider.as_str()),
                Some("gemini"),
                "{capability} should default to a gemini model"
            );
        }
    }

    #[test]
    fn ensure_checks_capability() {
        let registry = ModelRegistry::default();
        assert!(registry
            .ensure("gemini-2.5-flash-image", Capability::FitCheck)
            .is_some());
        assert!(registry
            .ensure("gemini-2.5-flash-image", Capability::Advice)
            .is_none());
        assert!(registry.ensure("missing", Capability::Advice).is_none());
    }

    #[test]
    fn capability_round_trips_through_env_names() {
        assert_eq!(Capability::FitCheck.env_key(), "LUMI_MODEL_FIT_CHECK");
        assert_eq!("grounded-search".parse::<Capability>(), Ok(Capability::GroundedSearch));
        assert!("teleport".parse::<Capability>().is_err());
    }
}
