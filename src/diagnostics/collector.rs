// SPDX-License-Identifier: MPL-2.0
//! Diagnostics collector for aggregating and storing diagnostic events.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Serialize;

use super::{BufferCapacity, CircularBuffer, DiagnosticEvent, DiagnosticEventKind};
use crate::error::{Error, Result};

/// Default channel capacity for event buffering.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Handle for sending diagnostic events to the collector.
///
/// Cheap to clone. Sending never blocks: events are dropped when the channel
/// is full or the collector is gone.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    event_tx: Sender<DiagnosticEvent>,
}

impl DiagnosticsHandle {
    /// A handle whose events go nowhere.
    #[must_use]
    pub fn disconnected() -> Self {
        let (event_tx, _event_rx) = bounded(1);
        Self { event_tx }
    }

    pub fn log(&self, kind: DiagnosticEventKind) {
        let _ = self.event_tx.try_send(DiagnosticEvent::new(kind));
    }

    /// Logs a warning and mirrors it on stderr.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        eprintln!("[WARN] {message}");
        self.log(DiagnosticEventKind::Warning { message });
    }
}

impl Default for DiagnosticsHandle {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// One event in an exported report, timed relative to collection start.
#[derive(Debug, Clone, Serialize)]
pub struct SerializableEvent {
    pub offset_ms: u64,
    #[serde(flatten)]
    pub kind: DiagnosticEventKind,
}

/// Exported diagnostics document.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub crate_version: &'static str,
    pub started_at: String,
    pub duration_ms: u64,
    pub event_count: usize,
    pub events: Vec<SerializableEvent>,
}

/// Receives events from handles and keeps the most recent ones.
pub struct DiagnosticsCollector {
    buffer: CircularBuffer<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    event_tx: Sender<DiagnosticEvent>,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
}

impl DiagnosticsCollector {
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        let (event_tx, event_rx) = bounded(DEFAULT_CHANNEL_CAPACITY);

        Self {
            buffer: CircularBuffer::new(capacity),
            event_rx,
            event_tx,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    /// Drains the channel into the buffer. Call on each UI tick.
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.buffer.push(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.buffer.iter()
    }

    /// The `count` most recent events, oldest first.
    pub fn latest(&self, count: usize) -> impl Iterator<Item = &DiagnosticEvent> {
        self.buffer.latest(count)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    #[allow(clippy::cast_possible_truncation)] // Duration in ms fits comfortably in u64
    #[must_use]
    pub fn build_report(&self) -> DiagnosticReport {
        let events: Vec<SerializableEvent> = self
            .buffer
            .iter()
            .map(|event| SerializableEvent {
                offset_ms: event
                    .timestamp
                    .saturating_duration_since(self.started_at)
                    .as_millis() as u64,
                kind: event.kind.clone(),
            })
            .collect();

        DiagnosticReport {
            crate_version: env!("CARGO_PKG_VERSION"),
            started_at: self.started_at_utc.to_rfc3339(),
            duration_ms: self.started_at.elapsed().as_millis() as u64,
            event_count: events.len(),
            events,
        }
    }

    /// Exports all collected events as a pretty-printed JSON report.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.build_report())
    }

    /// Writes the JSON report to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be written.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = self
            .export_json()
            .map_err(|e| Error::Io(format!("failed to serialize diagnostics: {e}")))?;
        fs::write(path, json)?;
        Ok(path.to_path_buf())
    }
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new(BufferCapacity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn handle_events_arrive_after_process_pending() {
        let mut collector = DiagnosticsCollector::default();
        let handle = collector.handle();

        handle.log(DiagnosticEventKind::PollStarted { load_id: 1 });
        assert!(collector.is_empty());

        collector.process_pending();
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn disconnected_handle_drops_silently() {
        let handle = DiagnosticsHandle::disconnected();
        handle.log(DiagnosticEventKind::PollStarted { load_id: 1 });
    }

    #[test]
    fn buffer_capacity_bounds_history() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::new(10));
        let handle = collector.handle();
        for load_id in 0..25 {
            handle.log(DiagnosticEventKind::PollStarted { load_id });
        }
        collector.process_pending();

        assert_eq!(collector.len(), 10);
        let first = collector.iter().next().map(|e| e.kind.clone());
        assert_eq!(first, Some(DiagnosticEventKind::PollStarted { load_id: 15 }));
    }

    #[test]
    fn export_json_contains_flattened_events() {
        let mut collector = DiagnosticsCollector::default();
        collector.handle().log(DiagnosticEventKind::Failed {
            load_id: 2,
            message: "boom".to_string(),
        });
        collector.process_pending();

        let json = collector.export_json().expect("export should succeed");
        assert!(json.contains("\"event_count\": 1"));
        assert!(json.contains("\"type\": \"failed\""));
        assert!(json.contains("\"offset_ms\""));
    }

    #[test]
    fn export_to_file_writes_report() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("reports").join("diag.json");
        let collector = DiagnosticsCollector::default();

        let written = collector.export_to_file(&path).expect("export should succeed");
        assert_eq!(written, path);
        assert!(fs::read_to_string(&path).expect("read").contains("crate_version"));
    }
}
