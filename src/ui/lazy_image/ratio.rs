// SPDX-License-Identifier: MPL-2.0
//! Layout ratio reservation.
//!
//! Before an image is decoded the component has no intrinsic size to lay
//! out with. A filler block whose height is a percentage of the width keeps
//! the box stable and avoids a layout jump once the image arrives.

use super::options::{AspectRatio, Dimension};
use crate::config::DEFAULT_NATURAL_RATIO;

/// Height / width of the most recently loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalRatio(f32);

impl NaturalRatio {
    /// Ratio of an image of `width` x `height` pixels; the default when
    /// `width` is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_size(width: u32, height: u32) -> Self {
        if width == 0 {
            return Self::default();
        }
        Self(height as f32 / width as f32)
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for NaturalRatio {
    fn default() -> Self {
        Self(DEFAULT_NATURAL_RATIO)
    }
}

/// Filler height as a percentage of the available width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioStyle {
    pub padding_percent: f32,
}

impl RatioStyle {
    fn from_percent(percent: f32) -> Option<Self> {
        (percent.is_finite() && percent > 0.0).then_some(Self {
            padding_percent: percent,
        })
    }
}

/// Picks the filler ratio.
///
/// Precedence: an explicit `ratio`, then a fixed `width` and `height` pair,
/// then the natural ratio of the last loaded image.
#[must_use]
pub fn ratio_style(
    ratio: Option<AspectRatio>,
    width: Option<Dimension>,
    height: Option<Dimension>,
    natural: NaturalRatio,
) -> Option<RatioStyle> {
    if let Some(ratio) = ratio {
        return RatioStyle::from_percent(100.0 / ratio.value());
    }

    if let (Some(w), Some(h)) = (
        width.and_then(Dimension::fixed),
        height.and_then(Dimension::fixed),
    ) {
        return RatioStyle::from_percent(100.0 * h / w);
    }

    RatioStyle::from_percent(100.0 * natural.value())
}
