// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the demo application.

use crate::ui::lazy_image;
use iced::Size;
use std::path::PathBuf;
use std::time::Instant;

/// Top-level messages consumed by `App::update`.
#[derive(Debug, Clone)]
pub enum Message {
    /// Forwarded to the image component.
    Image(lazy_image::Message),
    /// The source text field was edited.
    SourceInputChanged(String),
    /// Apply the text field as the new `src`.
    SubmitSource,
    /// Clear the source.
    ClearSource,
    /// The window was resized; drives `srcset` selection.
    WindowResized(Size),
    /// Drains diagnostic events into the log panel.
    Tick(Instant),
    /// Write the collected diagnostics to the export path.
    ExportDiagnostics,
}

/// Runtime flags passed in from the CLI.
///
/// String values are parsed in `App::new` so a bad value becomes a warning
/// in the event log instead of a startup failure.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub src: Option<String>,
    pub srcset: Option<String>,
    pub sizes: Option<String>,
    pub placeholder: Option<String>,
    /// `cover`, `fill`, `contain`, `none` or `scale-down`.
    pub fit: Option<String>,
    /// CSS-like position, e.g. `"left top"` or `"30% 70%"`.
    pub position: Option<String>,
    /// Width / height, e.g. `"16/9"`.
    pub ratio: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    /// Fetch immediately instead of on reveal.
    pub eager: bool,
    pub no_spinner: bool,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `ICED_LAZY_IMG_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
    /// Where `ExportDiagnostics` writes its JSON report.
    pub export_diagnostics: Option<PathBuf>,
}
