// SPDX-License-Identifier: MPL-2.0
//! View rendering for the demo application.

use super::Message;
use crate::diagnostics::{DiagnosticEvent, DiagnosticEventKind, DiagnosticsCollector};
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::lazy_image::{self, Slots};
use iced::widget::{button, center, column, container, row, scrollable, text, text_input, Column};
use iced::{Element, Length};

/// Number of events shown in the log panel.
const EVENT_LOG_LINES: usize = 200;

/// Context required to render the application view.
pub struct ViewContext<'a> {
    pub image: &'a lazy_image::State,
    pub collector: &'a DiagnosticsCollector,
    pub source_input: &'a str,
    pub status: Option<&'a str>,
}

pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    row![image_panel(&ctx), event_log(ctx.collector)]
        .spacing(spacing::MD)
        .padding(spacing::MD)
        .into()
}

fn image_panel<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let controls = row![
        text_input("Image URL or path", ctx.source_input)
            .on_input(Message::SourceInputChanged)
            .on_submit(Message::SubmitSource)
            .size(typography::BODY),
        button(text("Load").size(typography::BODY)).on_press(Message::SubmitSource),
        button(text("Clear").size(typography::BODY)).on_press(Message::ClearSource),
    ]
    .spacing(spacing::XS);

    let error = center(text("The image could not be loaded").color(palette::ERROR_500));
    let image = ctx.image.view(
        Slots::new()
            .error(error)
            .on_reveal(Message::Image(lazy_image::Message::Revealed)),
    );

    let status = text(ctx.status.unwrap_or_default())
        .size(typography::CAPTION)
        .color(palette::GRAY_400);

    column![
        controls,
        container(image).width(Length::Fill).height(Length::Fill),
        status,
    ]
    .spacing(spacing::SM)
    .width(Length::Fill)
    .into()
}

fn event_line(event: &DiagnosticEvent) -> String {
    match &event.kind {
        DiagnosticEventKind::Warning { message } => format!("warning: {message}"),
        kind => serde_json::to_string(kind).unwrap_or_else(|_| format!("{kind:?}")),
    }
}

fn event_log(collector: &DiagnosticsCollector) -> Element<'_, Message> {
    let lines = collector
        .latest(EVENT_LOG_LINES)
        .map(|event| text(event_line(event)).size(typography::CAPTION).into());

    let header = row![
        text(format!("Events ({})", collector.len())).size(typography::BODY),
        button(text("Export").size(typography::CAPTION)).on_press(Message::ExportDiagnostics),
    ]
    .spacing(spacing::XS);

    column![
        header,
        scrollable(Column::with_children(lines).spacing(spacing::XS / 2.0)).height(Length::Fill),
    ]
    .spacing(spacing::SM)
    .width(Length::Fixed(sizing::EVENT_LOG_WIDTH))
    .into()
}
