// SPDX-License-Identifier: MPL-2.0
//! Input surface of the lazy image component.
//!
//! Enumerated options parse from the same strings a host would write in
//! markup (`"scale-down"`, `"use-credentials"`, `"50% 50%"`) and reject
//! anything else with [`Error::InvalidOption`].

use std::fmt;
use std::str::FromStr;

use iced::alignment::{Horizontal, Vertical};
use iced::widget::image::FilterMethod;
use iced::{Color, ContentFit};
use serde::{Deserialize, Serialize};

use super::source::ImageSource;
use crate::config::Config;
use crate::domain::{FadeDuration, PollInterval};
use crate::error::{Error, Result};

fn invalid(option: &str, value: &str) -> Error {
    Error::InvalidOption(format!("{option}: {value}"))
}

// =============================================================================
// Enumerated options
// =============================================================================

/// CORS mode. Only `UseCredentials` sends the configured credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossOrigin {
    Anonymous,
    UseCredentials,
}

impl FromStr for CrossOrigin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "anonymous" => Ok(Self::Anonymous),
            "use-credentials" => Ok(Self::UseCredentials),
            other => Err(invalid("crossorigin", other)),
        }
    }
}

/// Load-priority hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Loading {
    /// Fetch as soon as a source is set.
    Eager,
    /// Fetch once the host reports the widget as revealed.
    #[default]
    Lazy,
}

impl FromStr for Loading {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "eager" => Ok(Self::Eager),
            "lazy" => Ok(Self::Lazy),
            other => Err(invalid("loading", other)),
        }
    }
}

/// How the image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fit {
    #[default]
    Cover,
    Fill,
    Contain,
    None,
    ScaleDown,
}

impl Fit {
    #[must_use]
    pub fn to_content_fit(self) -> ContentFit {
        match self {
            Fit::Cover => ContentFit::Cover,
            Fit::Fill => ContentFit::Fill,
            Fit::Contain => ContentFit::Contain,
            Fit::None => ContentFit::None,
            Fit::ScaleDown => ContentFit::ScaleDown,
        }
    }
}

impl FromStr for Fit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "cover" => Ok(Self::Cover),
            "fill" => Ok(Self::Fill),
            "contain" => Ok(Self::Contain),
            "none" => Ok(Self::None),
            "scale-down" => Ok(Self::ScaleDown),
            other => Err(invalid("fit", other)),
        }
    }
}

// =============================================================================
// ObjectPosition
// =============================================================================

/// Alignment of the image inside its box, as fractions of the free space
/// (`0.0` = start, `1.0` = end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPosition {
    pub x: f32,
    pub y: f32,
}

impl Default for ObjectPosition {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
    Either,
}

fn position_token(token: &str) -> Option<(Axis, f32)> {
    match token {
        "left" => Some((Axis::X, 0.0)),
        "right" => Some((Axis::X, 1.0)),
        "top" => Some((Axis::Y, 0.0)),
        "bottom" => Some((Axis::Y, 1.0)),
        "center" => Some((Axis::Either, 0.5)),
        _ => token
            .strip_suffix('%')?
            .parse::<f32>()
            .ok()
            .filter(|p| p.is_finite())
            .map(|p| (Axis::Either, p / 100.0)),
    }
}

impl ObjectPosition {
    /// Nearest alignment on the horizontal axis.
    #[must_use]
    pub fn horizontal(self) -> Horizontal {
        if self.x <= 0.25 {
            Horizontal::Left
        } else if self.x >= 0.75 {
            Horizontal::Right
        } else {
            Horizontal::Center
        }
    }

    /// Nearest alignment on the vertical axis.
    #[must_use]
    pub fn vertical(self) -> Vertical {
        if self.y <= 0.25 {
            Vertical::Top
        } else if self.y >= 0.75 {
            Vertical::Bottom
        } else {
            Vertical::Center
        }
    }
}

impl FromStr for ObjectPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let parsed: Option<Vec<(Axis, f32)>> = tokens.iter().map(|t| position_token(t)).collect();
        let parsed = parsed.ok_or_else(|| invalid("position", s))?;

        match parsed.as_slice() {
            [(Axis::Y, y)] => Ok(Self { x: 0.5, y: *y }),
            [(_, x)] => Ok(Self { x: *x, y: 0.5 }),
            // "top left" names the vertical axis first
            [(first_axis, first), (second_axis, second)] => match (first_axis, second_axis) {
                (Axis::X, Axis::X) | (Axis::Y, Axis::Y) => Err(invalid("position", s)),
                (Axis::Y, _) | (_, Axis::X) => Ok(Self {
                    x: *second,
                    y: *first,
                }),
                _ => Ok(Self {
                    x: *first,
                    y: *second,
                }),
            },
            _ => Err(invalid("position", s)),
        }
    }
}

impl fmt::Display for ObjectPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% {}%", self.x * 100.0, self.y * 100.0)
    }
}

// =============================================================================
// Dimensions and ratio
// =============================================================================

/// Explicit width or height of the component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Logical pixels (`"120"` or `"120px"`).
    Fixed(f32),
    /// Take all available space (`"100%"`).
    Fill,
}

impl Dimension {
    #[must_use]
    pub fn fixed(self) -> Option<f32> {
        match self {
            Dimension::Fixed(px) => Some(px),
            Dimension::Fill => None,
        }
    }

    #[must_use]
    pub fn to_length(self) -> iced::Length {
        match self {
            Dimension::Fixed(px) => iced::Length::Fixed(px),
            Dimension::Fill => iced::Length::Fill,
        }
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed == "100%" {
            return Ok(Self::Fill);
        }
        trimmed
            .strip_suffix("px")
            .unwrap_or(trimmed)
            .parse::<f32>()
            .ok()
            .filter(|px| px.is_finite() && *px >= 0.0)
            .map(Self::Fixed)
            .ok_or_else(|| invalid("dimension", s))
    }
}

/// Explicit aspect ratio as width / height (`16/9`, `1.5`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio(f32);

impl AspectRatio {
    /// `None` unless the ratio is finite and positive.
    #[must_use]
    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = match s.split_once('/') {
            Some((w, h)) => {
                let w: f32 = w.trim().parse().map_err(|_| invalid("ratio", s))?;
                let h: f32 = h.trim().parse().map_err(|_| invalid("ratio", s))?;
                w / h
            }
            None => s.trim().parse().map_err(|_| invalid("ratio", s))?,
        };
        Self::new(value).ok_or_else(|| invalid("ratio", s))
    }
}

// =============================================================================
// Styling passthrough
// =============================================================================

/// Styling forwarded to every image layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStyle {
    pub filter: FilterMethod,
    /// Upper bound applied on top of the fade opacity.
    pub opacity: f32,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            filter: FilterMethod::Linear,
            opacity: 1.0,
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Every input of the component.
///
/// Built with chained setters:
///
/// ```
/// use iced_lazy_img::ui::lazy_image::options::{Fit, Options};
///
/// let options = Options::new()
///     .src("photos/cat.jpg")
///     .placeholder_src("photos/cat-tiny.jpg")
///     .fit(Fit::Contain);
///
/// assert_eq!(options.fit, Fit::Contain);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub src: Option<String>,
    pub srcset: Option<String>,
    pub sizes: Option<String>,
    pub alt: Option<String>,
    pub crossorigin: Option<CrossOrigin>,
    pub loading: Loading,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub ratio: Option<AspectRatio>,
    pub placeholder_src: Option<String>,
    pub fit: Fit,
    pub position: ObjectPosition,
    pub img_class: Vec<String>,
    pub img_style: ImageStyle,
    pub no_spinner: bool,
    pub no_native_menu: bool,
    pub spinner_color: Option<Color>,
    pub spinner_size: Option<f32>,
    pub poll_interval: PollInterval,
    pub image_fade: FadeDuration,
    pub content_fade: FadeDuration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            src: None,
            srcset: None,
            sizes: None,
            alt: None,
            crossorigin: None,
            loading: Loading::default(),
            width: None,
            height: None,
            ratio: None,
            placeholder_src: None,
            fit: Fit::default(),
            position: ObjectPosition::default(),
            img_class: Vec::new(),
            img_style: ImageStyle::default(),
            no_spinner: false,
            no_native_menu: false,
            spinner_color: None,
            spinner_size: None,
            poll_interval: PollInterval::default(),
            image_fade: FadeDuration::from_millis(crate::config::DEFAULT_IMAGE_FADE_MS),
            content_fade: FadeDuration::from_millis(crate::config::DEFAULT_CONTENT_FADE_MS),
        }
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults taken from the user's settings file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] when `image.position` cannot be parsed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut options = Self::default();

        if let Some(fit) = config.image.fit {
            options.fit = fit;
        }
        if let Some(loading) = config.image.loading {
            options.loading = loading;
        }
        if let Some(position) = config.image.position.as_deref() {
            options.position = position.parse()?;
        }
        options.no_spinner = config.image.no_spinner.unwrap_or(false);
        options.spinner_size = config.image.spinner_size;

        if let Some(ms) = config.loading.poll_interval_ms {
            options.poll_interval = PollInterval::from_millis(ms);
        }
        if let Some(ms) = config.loading.image_fade_ms {
            options.image_fade = FadeDuration::from_millis(ms);
        }
        if let Some(ms) = config.loading.content_fade_ms {
            options.content_fade = FadeDuration::from_millis(ms);
        }

        Ok(options)
    }

    /// The source descriptor these options describe, `None` when empty.
    #[must_use]
    pub fn source(&self) -> Option<ImageSource> {
        ImageSource::resolve(
            self.src.as_deref(),
            self.srcset.as_deref(),
            self.sizes.as_deref(),
        )
    }

    #[must_use]
    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    #[must_use]
    pub fn srcset(mut self, srcset: impl Into<String>) -> Self {
        self.srcset = Some(srcset.into());
        self
    }

    #[must_use]
    pub fn sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    #[must_use]
    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    #[must_use]
    pub fn crossorigin(mut self, crossorigin: CrossOrigin) -> Self {
        self.crossorigin = Some(crossorigin);
        self
    }

    #[must_use]
    pub fn loading(mut self, loading: Loading) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub fn width(mut self, width: Dimension) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn height(mut self, height: Dimension) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn ratio(mut self, ratio: AspectRatio) -> Self {
        self.ratio = Some(ratio);
        self
    }

    #[must_use]
    pub fn placeholder_src(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder_src = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = fit;
        self
    }

    #[must_use]
    pub fn position(mut self, position: ObjectPosition) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn img_class(mut self, class: impl Into<String>) -> Self {
        self.img_class.push(class.into());
        self
    }

    #[must_use]
    pub fn img_style(mut self, style: ImageStyle) -> Self {
        self.img_style = style;
        self
    }

    #[must_use]
    pub fn no_spinner(mut self, no_spinner: bool) -> Self {
        self.no_spinner = no_spinner;
        self
    }

    #[must_use]
    pub fn no_native_menu(mut self, no_native_menu: bool) -> Self {
        self.no_native_menu = no_native_menu;
        self
    }

    #[must_use]
    pub fn spinner_color(mut self, color: Color) -> Self {
        self.spinner_color = Some(color);
        self
    }

    #[must_use]
    pub fn spinner_size(mut self, size: f32) -> Self {
        self.spinner_size = Some(size);
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: PollInterval) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn image_fade(mut self, fade: FadeDuration) -> Self {
        self.image_fade = fade;
        self
    }

    #[must_use]
    pub fn content_fade(mut self, fade: FadeDuration) -> Self {
        self.content_fade = fade;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageConfig;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn enumerated_options_parse_markup_strings() {
        assert_eq!("use-credentials".parse::<CrossOrigin>().ok(), Some(CrossOrigin::UseCredentials));
        assert_eq!("eager".parse::<Loading>().ok(), Some(Loading::Eager));
        assert_eq!("scale-down".parse::<Fit>().ok(), Some(Fit::ScaleDown));
    }

    #[test]
    fn invalid_enumerated_options_are_rejected() {
        assert!(matches!("stretch".parse::<Fit>(), Err(Error::InvalidOption(_))));
        assert!(matches!("credentials".parse::<CrossOrigin>(), Err(Error::InvalidOption(_))));
        assert!(matches!("auto".parse::<Loading>(), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn defaults_match_component_defaults() {
        let options = Options::default();
        assert_eq!(options.loading, Loading::Lazy);
        assert_eq!(options.fit, Fit::Cover);
        assert_eq!(options.position, ObjectPosition { x: 0.5, y: 0.5 });
        assert_eq!(options.poll_interval.as_millis(), 50);
        assert!(options.source().is_none());
    }

    #[test]
    fn fit_maps_to_content_fit() {
        assert_eq!(Fit::ScaleDown.to_content_fit(), ContentFit::ScaleDown);
        assert_eq!(Fit::None.to_content_fit(), ContentFit::None);
    }

    #[test]
    fn position_percentages() {
        let position: ObjectPosition = "25% 75%".parse().expect("valid position");
        assert_abs_diff_eq!(position.x, 0.25);
        assert_abs_diff_eq!(position.y, 0.75);
    }

    #[test]
    fn position_keywords_in_any_order() {
        let a: ObjectPosition = "left top".parse().expect("valid");
        let b: ObjectPosition = "top left".parse().expect("valid");
        assert_eq!(a, b);
        assert_eq!(a, ObjectPosition { x: 0.0, y: 0.0 });
    }

    #[test]
    fn single_position_keyword_centers_other_axis() {
        let bottom: ObjectPosition = "bottom".parse().expect("valid");
        assert_eq!(bottom, ObjectPosition { x: 0.5, y: 1.0 });
        assert_eq!(bottom.vertical(), Vertical::Bottom);
        assert_eq!(bottom.horizontal(), Horizontal::Center);
    }

    #[test]
    fn invalid_positions_are_rejected() {
        assert!("left right".parse::<ObjectPosition>().is_err());
        assert!("10px 10px".parse::<ObjectPosition>().is_err());
        assert!("".parse::<ObjectPosition>().is_err());
    }

    #[test]
    fn dimensions_parse() {
        assert_eq!("120".parse::<Dimension>().ok(), Some(Dimension::Fixed(120.0)));
        assert_eq!("80px".parse::<Dimension>().ok(), Some(Dimension::Fixed(80.0)));
        assert_eq!("100%".parse::<Dimension>().ok(), Some(Dimension::Fill));
        assert!("-4".parse::<Dimension>().is_err());
    }

    #[test]
    fn aspect_ratio_parses_fraction_and_decimal() {
        let wide: AspectRatio = "16/9".parse().expect("valid ratio");
        assert_abs_diff_eq!(wide.value(), 16.0 / 9.0);
        let plain: AspectRatio = "1.5".parse().expect("valid ratio");
        assert_abs_diff_eq!(plain.value(), 1.5);
        assert!("4/0".parse::<AspectRatio>().is_err());
        assert!(AspectRatio::new(0.0).is_none());
    }

    #[test]
    fn from_config_applies_sections() {
        let mut config = Config::default();
        config.image = ImageConfig {
            fit: Some(Fit::Contain),
            position: Some("right bottom".into()),
            loading: Some(Loading::Eager),
            no_spinner: Some(true),
            spinner_size: Some(24.0),
        };
        config.loading.poll_interval_ms = Some(5);

        let options = Options::from_config(&config).expect("valid config");
        assert_eq!(options.fit, Fit::Contain);
        assert_eq!(options.loading, Loading::Eager);
        assert_eq!(options.position, ObjectPosition { x: 1.0, y: 1.0 });
        assert!(options.no_spinner);
        assert_eq!(options.spinner_size, Some(24.0));
        assert_eq!(options.poll_interval.as_millis(), 10);
    }

    #[test]
    fn from_config_rejects_bad_position() {
        let mut config = Config::default();
        config.image.position = Some("middle".into());
        assert!(matches!(Options::from_config(&config), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn builder_collects_style_tags() {
        let options = Options::new().img_class("rounded").img_class("shadow");
        assert_eq!(options.img_class, vec!["rounded", "shadow"]);
    }
}
