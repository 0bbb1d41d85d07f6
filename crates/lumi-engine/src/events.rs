use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use lumi_contracts::events::{EventKind, EventWriter};
use serde_json::Value;
use uuid::Uuid;

/// Optional event log shared by the gateway and the shell. A failed write
/// never fails the user operation; the first failure is kept for the caller.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    writer: Option<EventWriter>,
    failure: Arc<Mutex<Option<String>>>,
}

impl EventSink {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: Some(EventWriter::new(path, Uuid::new_v4().to_string())),
            failure: Arc::default(),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.writer.as_ref().map(EventWriter::session_id)
    }

    pub fn emit(&self, kind: EventKind, fields: Value) {
        let Some(writer) = self.writer.as_ref() else {
            return;
        };
        if let Err(err) = writer.emit(kind, fields) {
            let mut failure = self
                .failure
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if failure.is_none() {
                *failure = Some(format!(
                    "event log write failed for {kind} ({}): {err:#}",
                    writer.path().display()
                ));
            }
        }
    }

    pub fn take_failure(&self) -> Option<String> {
        self.failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use lumi_contracts::events::{EventKind, EventRecord};
    use serde_json::json;

    use super::EventSink;

    #[test]
    fn disabled_sink_is_silent() {
        let sink = EventSink::disabled();
        sink.emit(EventKind::TabChanged, json!({"tab": "Cart"}));
        assert!(sink.session_id().is_none());
        assert!(sink.take_failure().is_none());
    }

    #[test]
    fn file_sink_writes_with_session_id() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let sink = EventSink::to_file(&path);
        sink.emit(EventKind::PhotoUploaded, json!({"mime_type": "image/png"}));

        let record: EventRecord = serde_json::from_str(fs::read_to_string(&path)?.trim())?;
        assert_eq!(record.kind, EventKind::PhotoUploaded);
        assert_eq!(Some(record.session_id.as_str()), sink.session_id());
        assert_eq!(record.fields["mime_type"], json!("image/png"));
        Ok(())
    }

    #[test]
    fn write_failures_are_kept_once() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        // A directory cannot be opened for appending.
        let sink = EventSink::to_file(temp.path());
        sink.emit(EventKind::TabChanged, json!({}));
        sink.emit(EventKind::ThemeChanged, json!({}));

        let failure = sink.take_failure().unwrap_or_default();
        assert!(failure.contains("tab_changed"));
        assert!(sink.take_failure().is_none());
        Ok(())
    }
}
