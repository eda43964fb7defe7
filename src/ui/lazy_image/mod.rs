// SPDX-License-Identifier: MPL-2.0
//! Responsive, lazy-loading image component.
//!
//! Shows a placeholder while the real image loads, swaps sources through a
//! two-slot buffer so a replacement never flashes an empty box, and keeps
//! the layout ratio stable before the intrinsic size is known.
//!
//! # Usage
//!
//! The host owns a [`State`], forwards [`Message`]s to [`State::update`],
//! batches [`State::subscription`] into its own, and reacts to the returned
//! [`Effect`]:
//!
//! ```ignore
//! let (image, task) = lazy_image::State::new(options, loader, diagnostics);
//!
//! match image.update(message) {
//!     (lazy_image::Effect::Loaded { url }, task) => { /* ... */ }
//!     (lazy_image::Effect::Failed(error), task) => { /* ... */ }
//!     (lazy_image::Effect::None, task) => { /* ... */ }
//! }
//! ```

pub mod component;
pub mod loader;
pub mod options;
pub mod poller;
pub mod ratio;
pub mod render;
pub mod slots;
pub mod source;
pub mod srcset;
pub mod transition;
pub mod view;

pub use component::{Effect, Message, State};
pub use loader::{LoadRequest, Loader, LoaderSettings, Probe};
pub use options::{AspectRatio, CrossOrigin, Dimension, Fit, ImageStyle, Loading, ObjectPosition, Options};
pub use poller::{Completeness, DecodeState, LoadId};
pub use ratio::{NaturalRatio, RatioStyle};
pub use render::{assemble, ContentKind, ContentLayer, ImageLayer, Indicator, LayerPhase, RenderTree};
pub use slots::{Slot, SlotBuffer, SlotIndex};
pub use source::{ImageSource, Viewport};
pub use view::Slots;
