// SPDX-License-Identifier: MPL-2.0
//! Render assembly.
//!
//! [`assemble`] describes what a frame shows without touching any widget:
//! the optional ratio filler, zero to two image layers, and the content
//! layer on top. The view module turns the description into elements.

use iced::widget::image::Handle;
use iced::Color;

use super::component::State;
use super::options::{Dimension, Fit, ImageStyle, ObjectPosition};
use super::ratio::RatioStyle;
use super::slots::SlotIndex;
use super::source::ImageSource;

/// Role of an image layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPhase {
    /// Incoming image, hidden until complete. Observed for load and error.
    Waiting,
    /// Image on display.
    Loaded,
}

#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub slot: SlotIndex,
    pub source: ImageSource,
    pub phase: LayerPhase,
    /// Load and error of this layer drive the component.
    pub observed: bool,
    pub handle: Option<Handle>,
    pub opacity: f32,
    pub fit: Fit,
    pub position: ObjectPosition,
    pub style: ImageStyle,
    pub tags: Vec<String>,
}

impl ImageLayer {
    /// Whether anything would be painted.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.handle.is_some() && self.opacity > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Indicator {
    /// Host-supplied loading content.
    Custom,
    Spinner {
        color: Option<Color>,
        size: Option<f32>,
        rotation: f32,
    },
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentKind {
    /// Host content: the error fragment when `error`, the default one otherwise.
    Content { error: bool },
    Loading(Indicator),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentLayer {
    pub kind: ContentKind,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct RenderTree {
    /// Accessible label.
    pub label: Option<String>,
    pub no_native_menu: bool,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub filler: Option<RatioStyle>,
    /// Bottom to top.
    pub images: Vec<ImageLayer>,
    pub content: ContentLayer,
}

/// Describes the current frame of `state`.
///
/// `has_custom_loading` tells whether the host supplies its own loading
/// content, which replaces the spinner.
#[must_use]
pub fn assemble(state: &State, has_custom_loading: bool) -> RenderTree {
    let options = state.options();
    let waiting = state.slots().waiting();

    let images = if state.has_error() {
        Vec::new()
    } else {
        state
            .slots()
            .occupied()
            .map(|(index, slot)| {
                let phase = if index == waiting {
                    LayerPhase::Waiting
                } else {
                    LayerPhase::Loaded
                };
                let opacity = match phase {
                    LayerPhase::Waiting => 0.0,
                    LayerPhase::Loaded => state.image_opacity() * options.img_style.opacity,
                };
                ImageLayer {
                    slot: index,
                    source: slot.source.clone(),
                    phase,
                    observed: phase == LayerPhase::Waiting,
                    handle: slot.handle.clone(),
                    opacity,
                    fit: options.fit,
                    position: options.position,
                    style: options.img_style,
                    tags: options.img_class.clone(),
                }
            })
            .collect()
    };

    let kind = if state.is_loading() {
        let indicator = if has_custom_loading {
            Indicator::Custom
        } else if options.no_spinner {
            Indicator::Nothing
        } else {
            Indicator::Spinner {
                color: options.spinner_color,
                size: options.spinner_size,
                rotation: state.spinner_rotation(),
            }
        };
        ContentKind::Loading(indicator)
    } else {
        ContentKind::Content {
            error: state.has_error(),
        }
    };

    RenderTree {
        label: options.alt.clone(),
        no_native_menu: options.no_native_menu,
        width: options.width,
        height: options.height,
        filler: state.ratio_style(),
        images,
        content: ContentLayer {
            kind,
            opacity: state.content_opacity(),
        },
    }
}
