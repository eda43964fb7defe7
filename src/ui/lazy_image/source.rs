// SPDX-License-Identifier: MPL-2.0
//! Image source descriptors.

use super::srcset;

/// What the host wants loaded: a plain URL, a responsive candidate list, or
/// both. Compared by value to detect source changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageSource {
    src: Option<String>,
    srcset: Option<String>,
    sizes: Option<String>,
}

/// Display metrics used to resolve `srcset` / `sizes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical viewport width in pixels.
    pub width: f32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            scale_factor: 1.0,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ImageSource {
    /// Builds a descriptor from the three source inputs.
    ///
    /// Returns `None` when all of them are absent or blank: that is the
    /// "empty source" state, which clears the component.
    #[must_use]
    pub fn resolve(src: Option<&str>, srcset: Option<&str>, sizes: Option<&str>) -> Option<Self> {
        let source = Self {
            src: non_empty(src),
            srcset: non_empty(srcset),
            sizes: non_empty(sizes),
        };
        if source.src.is_none() && source.srcset.is_none() && source.sizes.is_none() {
            None
        } else {
            Some(source)
        }
    }

    /// Shorthand for a plain URL source.
    #[must_use]
    pub fn from_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            srcset: None,
            sizes: None,
        }
    }

    #[must_use]
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    #[must_use]
    pub fn srcset(&self) -> Option<&str> {
        self.srcset.as_deref()
    }

    #[must_use]
    pub fn sizes(&self) -> Option<&str> {
        self.sizes.as_deref()
    }

    /// The URL that is actually fetched for `viewport`.
    ///
    /// The best `srcset` candidate wins; `src` is the fallback. `None` when
    /// the descriptor only carries `sizes` (nothing to fetch).
    #[must_use]
    pub fn current_src(&self, viewport: Viewport) -> Option<String> {
        if let Some(srcset) = self.srcset.as_deref() {
            let candidates = srcset::parse_srcset(srcset);
            let size = srcset::source_size_px(self.sizes.as_deref(), viewport);
            if let Some(candidate) = srcset::select(&candidates, size, viewport.scale_factor) {
                return Some(candidate.url.clone());
            }
        }
        self.src.clone()
    }
}
