// SPDX-License-Identifier: MPL-2.0
//! Loading spinner drawn on a canvas.

use crate::ui::design_tokens::{opacity, sizing};
use iced::widget::canvas::{self, path, Canvas, Frame, Geometry, Path, Stroke};
use iced::{mouse, Color, Length, Radians, Rectangle, Renderer, Theme};
use std::f32::consts::PI;

/// A half-circle arc rotating over a faint track.
///
/// The rotation is owned by the caller and advanced on each animation tick.
#[derive(Debug, Clone, Copy)]
pub struct AnimatedSpinner {
    rotation: f32,
    color: Option<Color>,
    size: f32,
    opacity: f32,
}

impl AnimatedSpinner {
    /// `color` falls back to the theme's primary color.
    #[must_use]
    pub fn new(color: Option<Color>, rotation: f32) -> Self {
        Self {
            rotation,
            color,
            size: sizing::SPINNER_DEFAULT,
            opacity: opacity::OPAQUE,
        }
    }

    /// Diameter in logical pixels.
    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.size = size.max(sizing::SPINNER_MIN);
        self
    }

    /// Multiplies the color's alpha, for fading in.
    #[must_use]
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    fn stroke_width(&self) -> f32 {
        (self.size / 12.0).max(1.5)
    }

    pub fn into_element<'a, Message: 'a>(self) -> iced::Element<'a, Message> {
        let size = self.size;
        Canvas::new(self)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .into()
    }
}

impl<Message> canvas::Program<Message> for AnimatedSpinner {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let base = self.color.unwrap_or(theme.palette().primary);
        let color = Color {
            a: base.a * self.opacity,
            ..base
        };
        let stroke_width = self.stroke_width();

        let mut frame = Frame::new(renderer, bounds.size());
        let center = frame.center();
        let radius = (frame.width().min(frame.height()) - stroke_width) / 2.0;

        frame.stroke(
            &Path::circle(center, radius),
            Stroke::default().with_width(stroke_width).with_color(Color {
                a: color.a * opacity::OVERLAY_SUBTLE,
                ..color
            }),
        );

        // Arc starts at 12 o'clock when rotation is zero.
        let start = self.rotation - PI / 2.0;
        let arc = Path::new(|builder| {
            builder.arc(path::Arc {
                center,
                radius,
                start_angle: Radians(start),
                end_angle: Radians(start + PI),
            });
        });
        frame.stroke(
            &arc,
            Stroke::default()
                .with_width(stroke_width)
                .with_color(color)
                .with_line_cap(canvas::LineCap::Round),
        );

        vec![frame.into_geometry()]
    }
}
