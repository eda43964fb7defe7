// SPDX-License-Identifier: MPL-2.0
//! Turns a [`RenderTree`] into Iced elements.

use iced::widget::{center, container, image, text, Space, Stack};
use iced::{Element, Length};

use super::component::State;
use super::options::Fit;
use super::render::{self, ContentKind, ImageLayer, Indicator, RenderTree};
use crate::ui::widgets::{ratio_box, AnimatedSpinner};

/// Content supplied by the host.
pub struct Slots<'a, Message> {
    /// Shown once loaded without error.
    pub default: Option<Element<'a, Message>>,
    /// Shown after a failed load.
    pub error: Option<Element<'a, Message>>,
    /// Replaces the spinner while loading.
    pub loading: Option<Element<'a, Message>>,
    /// Published when the image first becomes visible.
    pub on_reveal: Option<Message>,
}

impl<Message> Default for Slots<'_, Message> {
    fn default() -> Self {
        Self {
            default: None,
            error: None,
            loading: None,
            on_reveal: None,
        }
    }
}

impl<'a, Message> Slots<'a, Message> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn default_content(mut self, content: impl Into<Element<'a, Message>>) -> Self {
        self.default = Some(content.into());
        self
    }

    #[must_use]
    pub fn error(mut self, content: impl Into<Element<'a, Message>>) -> Self {
        self.error = Some(content.into());
        self
    }

    #[must_use]
    pub fn loading(mut self, content: impl Into<Element<'a, Message>>) -> Self {
        self.loading = Some(content.into());
        self
    }

    #[must_use]
    pub fn on_reveal(mut self, message: Message) -> Self {
        self.on_reveal = Some(message);
        self
    }
}

fn image_layer<'a, Message: 'a>(layer: &ImageLayer) -> Option<Element<'a, Message>> {
    let handle = layer.handle.clone()?;

    let picture = image(handle)
        .content_fit(layer.fit.to_content_fit())
        .filter_method(layer.style.filter)
        .opacity(layer.opacity);

    // Cover and fill use the whole box; the others are placed by position.
    let element: Element<'a, Message> = match layer.fit {
        Fit::Cover | Fit::Fill => picture.width(Length::Fill).height(Length::Fill).into(),
        Fit::Contain | Fit::None | Fit::ScaleDown => container(picture)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(layer.position.horizontal())
            .align_y(layer.position.vertical())
            .into(),
    };
    Some(element)
}

fn content_layer<'a, Message: 'a>(tree: &RenderTree, slots: &mut Slots<'a, Message>) -> Option<Element<'a, Message>> {
    match &tree.content.kind {
        // Without an error slot the alt text stands in for the image.
        ContentKind::Content { error: true } => slots
            .error
            .take()
            .or_else(|| tree.label.clone().map(|label| center(text(label)).into())),
        ContentKind::Content { error: false } => slots.default.take(),
        ContentKind::Loading(Indicator::Custom) => slots.loading.take().map(|content| center(content).into()),
        ContentKind::Loading(Indicator::Spinner { color, size, rotation }) => {
            let mut spinner = AnimatedSpinner::new(*color, *rotation).opacity(tree.content.opacity);
            if let Some(size) = size {
                spinner = spinner.size(*size);
            }
            Some(center(spinner.into_element()).into())
        }
        ContentKind::Loading(Indicator::Nothing) => None,
    }
}

/// Builds the widget for `state`.
pub fn view<'a, Message: Clone + 'a>(state: &State, mut slots: Slots<'a, Message>) -> Element<'a, Message> {
    let tree = render::assemble(state, slots.loading.is_some());

    let mut stack = Stack::new().width(Length::Fill).height(Length::Fill);
    stack = stack.push(Space::new().width(Length::Fill).height(Length::Fill));

    for layer in tree.images.iter().filter(|layer| layer.is_visible()) {
        if let Some(element) = image_layer(layer) {
            stack = stack.push(element);
        }
    }
    if let Some(content) = content_layer(&tree, &mut slots) {
        stack = stack.push(container(content).width(Length::Fill).height(Length::Fill));
    }

    let mut frame = ratio_box(stack)
        .padding_percent(tree.filler.map(|filler| filler.padding_percent))
        .width(tree.width.map_or(Length::Fill, |w| w.to_length()))
        .height(tree.height.map_or(Length::Shrink, |h| h.to_length()));
    if let Some(message) = slots.on_reveal.take() {
        frame = frame.on_reveal(message);
    }
    frame.into()
}

impl State {
    /// See [`view`].
    pub fn view<'a, Message: Clone + 'a>(&self, slots: Slots<'a, Message>) -> Element<'a, Message> {
        view(self, slots)
    }
}
