use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use lumi_contracts::models::Capability;

use crate::keys::ApiKeySlot;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_base: String,
    pub api_key: ApiKeySlot,
    /// `None` waits on the remote model indefinitely.
    pub request_timeout: Option<Duration>,
    pub model_overrides: BTreeMap<Capability, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: ApiKeySlot::default(),
            request_timeout: None,
            model_overrides: BTreeMap::new(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_base = non_empty("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("GOOGLE_API_KEY"))
            .or_else(|| non_empty("API_KEY"));
        let request_timeout = non_empty("LUMI_REQUEST_TIMEOUT_S")
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .map(Duration::from_secs_f64);
        let model_overrides = Capability::ALL
            .into_iter()
            .filter_map(|capability| {
                non_empty(&capability.env_key()).map(|model| (capability, model))
            })
            .collect();

        Self {
            api_base,
            api_key: ApiKeySlot::new(api_key),
            request_timeout,
            model_overrides,
        }
    }
}
