// SPDX-License-Identifier: MPL-2.0
//! `iced_lazy_img` is a responsive, lazy-loading image component for the
//! Iced GUI framework.
//!
//! It resolves `src`/`srcset`/`sizes` against the current viewport, shows a
//! placeholder and a spinner while loading, crossfades between sources
//! without flashing an empty box, and reserves layout space from an explicit
//! or intrinsic aspect ratio. A small demo application lives in [`app`].

#![doc(html_root_url = "https://docs.rs/iced_lazy_img/0.1.0")]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
