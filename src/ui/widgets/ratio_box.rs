// SPDX-License-Identifier: MPL-2.0
//! A box whose height follows its width.
//!
//! Reserves `width * percent / 100` of height for its content, the way a
//! `padding-bottom` filler does, and reports the first time its bounds
//! enter the visible viewport.

use iced::advanced::layout::{self, Layout};
use iced::advanced::mouse;
use iced::advanced::overlay;
use iced::advanced::renderer;
use iced::advanced::widget::{self, tree, Widget};
use iced::advanced::{Clipboard, Shell};
use iced::{Element, Event, Length, Rectangle, Size};

#[derive(Debug, Default)]
struct RevealState {
    revealed: bool,
}

pub struct RatioBox<'a, Message, Theme, Renderer> {
    content: Element<'a, Message, Theme, Renderer>,
    padding_percent: Option<f32>,
    width: Length,
    height: Length,
    on_reveal: Option<Message>,
}

impl<'a, Message, Theme, Renderer> RatioBox<'a, Message, Theme, Renderer> {
    pub fn new(content: impl Into<Element<'a, Message, Theme, Renderer>>) -> Self {
        Self {
            content: content.into(),
            padding_percent: None,
            width: Length::Fill,
            height: Length::Shrink,
            on_reveal: None,
        }
    }

    /// Height as a percentage of the width. `None` lets `height` decide.
    #[must_use]
    pub fn padding_percent(mut self, percent: Option<f32>) -> Self {
        self.padding_percent = percent.filter(|p| p.is_finite() && *p > 0.0);
        self
    }

    #[must_use]
    pub fn width(mut self, width: impl Into<Length>) -> Self {
        self.width = width.into();
        self
    }

    #[must_use]
    pub fn height(mut self, height: impl Into<Length>) -> Self {
        self.height = height.into();
        self
    }

    /// Message published once, when the box first intersects the viewport.
    #[must_use]
    pub fn on_reveal(mut self, message: Message) -> Self {
        self.on_reveal = Some(message);
        self
    }
}

/// Size of the box for the given constraints.
fn resolve_size(
    max: Size,
    width: Length,
    height: Length,
    padding_percent: Option<f32>,
    content_height: f32,
) -> Size {
    let width = match width {
        Length::Fixed(w) => w.min(max.width),
        _ => max.width,
    };

    let height = match (height, padding_percent) {
        (Length::Fixed(h), _) => h,
        (_, Some(percent)) if width.is_finite() => width * percent / 100.0,
        (Length::Fill | Length::FillPortion(_), None) => max.height,
        _ => content_height,
    };

    Size::new(width, height.min(max.height))
}

impl<Message, Theme, Renderer> Widget<Message, Theme, Renderer> for RatioBox<'_, Message, Theme, Renderer>
where
    Message: Clone,
    Renderer: renderer::Renderer,
{
    fn size(&self) -> Size<Length> {
        Size::new(self.width, self.height)
    }

    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<RevealState>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(RevealState::default())
    }

    fn children(&self) -> Vec<widget::Tree> {
        vec![widget::Tree::new(&self.content)]
    }

    fn diff(&self, tree: &mut widget::Tree) {
        tree.diff_children(&[&self.content]);
    }

    fn layout(&mut self, tree: &mut widget::Tree, renderer: &Renderer, limits: &layout::Limits) -> layout::Node {
        let limits = limits.width(self.width).height(self.height);
        let max = limits.max();

        let content_height = if self.padding_percent.is_none() && matches!(self.height, Length::Shrink) {
            self.content
                .as_widget_mut()
                .layout(&mut tree.children[0], renderer, &limits)
                .size()
                .height
        } else {
            0.0
        };

        let size = resolve_size(max, self.width, self.height, self.padding_percent, content_height);
        let content = self.content.as_widget_mut().layout(
            &mut tree.children[0],
            renderer,
            &layout::Limits::new(Size::ZERO, size),
        );

        layout::Node::with_children(size, vec![content])
    }

    fn draw(
        &self,
        tree: &widget::Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &renderer::Style,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
    ) {
        let Some(content_layout) = layout.children().next() else {
            return;
        };
        renderer.with_layer(layout.bounds(), |renderer| {
            self.content.as_widget().draw(
                &tree.children[0],
                renderer,
                theme,
                style,
                content_layout,
                cursor,
                viewport,
            );
        });
    }

    fn update(
        &mut self,
        tree: &mut widget::Tree,
        event: &Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        renderer: &Renderer,
        clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        viewport: &Rectangle,
    ) {
        let state = tree.state.downcast_mut::<RevealState>();
        if !state.revealed && layout.bounds().intersects(viewport) {
            state.revealed = true;
            if let Some(message) = self.on_reveal.clone() {
                shell.publish(message);
            }
        }

        if let Some(content_layout) = layout.children().next() {
            self.content.as_widget_mut().update(
                &mut tree.children[0],
                event,
                content_layout,
                cursor,
                renderer,
                clipboard,
                shell,
                viewport,
            );
        }
    }

    fn mouse_interaction(
        &self,
        tree: &widget::Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
        renderer: &Renderer,
    ) -> mouse::Interaction {
        layout.children().next().map_or(mouse::Interaction::None, |content_layout| {
            self.content
                .as_widget()
                .mouse_interaction(&tree.children[0], content_layout, cursor, viewport, renderer)
        })
    }

    fn operate(
        &mut self,
        tree: &mut widget::Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        operation: &mut dyn widget::Operation,
    ) {
        if let Some(content_layout) = layout.children().next() {
            self.content
                .as_widget_mut()
                .operate(&mut tree.children[0], content_layout, renderer, operation);
        }
    }

    fn overlay<'b>(
        &'b mut self,
        tree: &'b mut widget::Tree,
        layout: Layout<'b>,
        renderer: &Renderer,
        viewport: &Rectangle,
        translation: iced::Vector,
    ) -> Option<overlay::Element<'b, Message, Theme, Renderer>> {
        let content_layout = layout.children().next()?;
        self.content.as_widget_mut().overlay(
            &mut tree.children[0],
            content_layout,
            renderer,
            viewport,
            translation,
        )
    }
}

impl<'a, Message, Theme, Renderer> From<RatioBox<'a, Message, Theme, Renderer>> for Element<'a, Message, Theme, Renderer>
where
    Message: Clone + 'a,
    Theme: 'a,
    Renderer: renderer::Renderer + 'a,
{
    fn from(ratio_box: RatioBox<'a, Message, Theme, Renderer>) -> Self {
        Self::new(ratio_box)
    }
}

pub fn ratio_box<'a, Message, Theme, Renderer>(
    content: impl Into<Element<'a, Message, Theme, Renderer>>,
) -> RatioBox<'a, Message, Theme, Renderer>
where
    Renderer: renderer::Renderer,
{
    RatioBox::new(content)
}
