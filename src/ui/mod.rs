// SPDX-License-Identifier: MPL-2.0
//! User interface components.
//!
//! Components follow the Elm-style "state down, messages up" pattern: each
//! one owns a `State`, handles its own `Message`s and reports to the host
//! through an `Effect`.
//!
//! - [`lazy_image`] - Responsive, lazy-loading image with placeholder and crossfade
//! - [`widgets`] - Custom Iced widgets (spinner, ratio box)
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)

pub mod design_tokens;
pub mod lazy_image;
pub mod widgets;
