// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types for the image loading lifecycle.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Why a pending completeness poll was dropped before it resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// A new source replaced the one being polled.
    SourceChanged,
    /// The load cycle failed.
    Error,
    /// The component was torn down.
    Unmount,
}

/// A diagnostic event with timestamp.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// When the event occurred (monotonic clock for duration calculations)
    pub timestamp: Instant,
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
        }
    }
}

/// What happened.
///
/// `load_id` correlates the events of one load cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    /// The resolved source changed; `None` means the source became empty.
    SourceChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// A fetch was issued for the waiting slot.
    LoadStarted { load_id: u64, url: String },

    /// The lazy loading hint postponed a fetch until reveal.
    LoadDeferred { load_id: u64 },

    /// Intrinsic size became known (the load event).
    NaturalSize {
        load_id: u64,
        width: u32,
        height: u32,
    },

    /// The image was not complete at load time; polling started.
    PollStarted { load_id: u64 },

    /// A pending poll was dropped.
    PollCancelled { load_id: u64, reason: CancelReason },

    /// The image became complete and was promoted.
    Ready {
        load_id: u64,
        url: String,
        polls: u32,
    },

    /// The load cycle failed.
    Failed { load_id: u64, message: String },

    /// Non-critical issue (placeholder failed, stale message, ...).
    Warning { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_gets_current_timestamp() {
        let before = Instant::now();
        let event = DiagnosticEvent::new(DiagnosticEventKind::PollStarted { load_id: 1 });
        assert!(event.timestamp >= before);
    }

    #[test]
    fn kind_serializes_with_type_tag() {
        let kind = DiagnosticEventKind::PollCancelled {
            load_id: 3,
            reason: CancelReason::SourceChanged,
        };

        let json = serde_json::to_string(&kind).expect("serialization should succeed");
        assert!(json.contains("\"type\":\"poll_cancelled\""));
        assert!(json.contains("\"reason\":\"source_changed\""));
    }

    #[test]
    fn empty_source_omits_url() {
        let json = serde_json::to_string(&DiagnosticEventKind::SourceChanged { url: None })
            .expect("serialization should succeed");
        assert_eq!(json, r#"{"type":"source_changed"}"#);
    }

    #[test]
    fn kind_deserializes_from_json() {
        let json = r#"{"type":"ready","load_id":7,"url":"a.jpg","polls":2}"#;
        let kind: DiagnosticEventKind =
            serde_json::from_str(json).expect("deserialization should succeed");

        assert_eq!(
            kind,
            DiagnosticEventKind::Ready {
                load_id: 7,
                url: "a.jpg".to_string(),
                polls: 2,
            }
        );
    }
}
