use std::fmt;
use std::sync::{Arc, RwLock};

use anyhow::Result;

/// Shared slot for the Gemini API key. Filled from the environment at
/// startup or later by an interactive [`KeySelector`].
#[derive(Clone, Default)]
pub struct ApiKeySlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl ApiKeySlot {
    pub fn new(key: Option<String>) -> Self {
        let slot = Self::default();
        if let Some(key) = key {
            slot.set(key);
        }
        slot
    }

    pub fn get(&self) -> Option<String> {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }

    pub fn set(&self, key: impl Into<String>) {
        let key = key.into();
        let key = key.trim();
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        };
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl fmt::Debug for ApiKeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "<set>" } else { "<unset>" };
        f.debug_tuple("ApiKeySlot").field(&state).finish()
    }
}

/// Precondition hook for the studio image model, which needs a paid key.
pub trait KeySelector {
    fn has_selected_key(&self) -> bool;
    fn open_select_key(&mut self) -> Result<()>;
}

/// Non-interactive selector: reports the slot state and never prompts.
impl KeySelector for ApiKeySlot {
    fn has_selected_key(&self) -> bool {
        self.is_set()
    }

    fn open_select_key(&mut self) -> Result<()> {
        Ok(())
    }
}
