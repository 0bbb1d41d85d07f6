use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every event a storefront session can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SessionStarted,
    TabChanged,
    CartUpdated,
    ThemeChanged,
    PhotoUploaded,
    StaleResponseDropped,
    GatewayCall,
    ModelFallback,
    ProductImageUnavailable,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::SessionStarted => "session_started",
            EventKind::TabChanged => "tab_changed",
            EventKind::CartUpdated => "cart_updated",
            EventKind::ThemeChanged => "theme_changed",
            EventKind::PhotoUploaded => "photo_uploaded",
            EventKind::StaleResponseDropped => "stale_response_dropped",
            EventKind::GatewayCall => "gateway_call",
            EventKind::ModelFallback => "model_fallback",
            EventKind::ProductImageUnavailable => "product_image_unavailable",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RESERVED_KEYS: [&str; 4] = ["type", "session_id", "seq", "ts"];

/// One line of `events.jsonl`. The envelope keys are owned by the writer;
/// event fields are flattened next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub session_id: String,
    /// Position within the session, starting at 1.
    pub seq: u64,
    pub ts: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Append-only JSONL log for one storefront session. The file is opened on
/// the first event and kept open for the rest of the session.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    session_id: String,
    state: Mutex<WriterState>,
}

#[derive(Debug, Default)]
struct WriterState {
    file: Option<File>,
    seq: u64,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                session_id: session_id.into(),
                state: Mutex::new(WriterState::default()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Writes one record. Non-object `fields` are dropped and envelope keys
    /// inside `fields` are ignored.
    pub fn emit(&self, kind: EventKind, fields: Value) -> anyhow::Result<EventRecord> {
        let mut fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for key in RESERVED_KEYS {
            fields.remove(key);
        }

        let mut state = self
            .inner
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        let record = EventRecord {
            kind,
            session_id: self.inner.session_id.clone(),
            seq: state.seq + 1,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            fields,
        };
        let line = serde_json::to_string(&record)?;

        if state.file.is_none() {
            let file = self.open()?;
            state.file = Some(file);
        }
        if let Some(file) = state.file.as_mut() {
            writeln!(file, "{line}")
                .with_context(|| format!("failed appending to {}", self.inner.path.display()))?;
        }
        state.seq = record.seq;
        Ok(record)
    }

    fn open(&self) -> anyhow::Result<File> {
        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)
            .with_context(|| format!("failed opening {}", self.inner.path.display()))
    }
}
