// SPDX-License-Identifier: MPL-2.0
//! Diagnostics for the image loading lifecycle.
//!
//! Components log typed events through a cheap, cloneable
//! [`DiagnosticsHandle`]. The host owns a [`DiagnosticsCollector`] that drains
//! them into a memory-bounded [`CircularBuffer`] and can export the history
//! as JSON.
//!
//! Logging never blocks: when the channel is full or nobody collects, events
//! are dropped.

mod buffer;
mod collector;
mod events;

pub use crate::domain::BufferCapacity;
pub use buffer::CircularBuffer;
pub use collector::{DiagnosticReport, DiagnosticsCollector, DiagnosticsHandle, SerializableEvent};
pub use events::{CancelReason, DiagnosticEvent, DiagnosticEventKind};
