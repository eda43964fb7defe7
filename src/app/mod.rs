// SPDX-License-Identifier: MPL-2.0
//! Demo application hosting one lazy image.
//!
//! The `App` struct wires the image component to a source text field, the
//! window size (for `srcset` selection) and an event log fed by the
//! diagnostics collector. Startup options come from `settings.toml` and are
//! overridden by CLI flags.

mod message;
mod view;

pub use message::{Flags, Message};

use crate::config::{self, Config};
use crate::diagnostics::{BufferCapacity, DiagnosticsCollector, DiagnosticsHandle};
use crate::ui::lazy_image::{self, Dimension, Loader, Loading, Options, Viewport};
use iced::{window, Element, Subscription, Task, Theme};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const WINDOW_DEFAULT_HEIGHT: u32 = 650;
pub const WINDOW_DEFAULT_WIDTH: u32 = 1100;
pub const MIN_WINDOW_HEIGHT: u32 = 400;
pub const MIN_WINDOW_WIDTH: u32 = 600;

/// How often the event log drains the diagnostics channel.
const LOG_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// File name used when no `--export-diagnostics` path was given.
const DEFAULT_EXPORT_FILE: &str = "lazy-img-diagnostics.json";

/// Everything the application needs at boot, prepared before the event loop
/// starts so failures surface as a plain error.
#[derive(Debug, Clone)]
struct Startup {
    flags: Flags,
    config: Config,
    config_warning: Option<String>,
    loader: Loader,
}

/// Root Iced application state.
pub struct App {
    image: lazy_image::State,
    collector: DiagnosticsCollector,
    diagnostics: DiagnosticsHandle,
    source_input: String,
    export_path: PathBuf,
    /// Last outcome reported by the image, shown under it.
    status: Option<String>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("source", &self.image.source())
            .field("is_loading", &self.image.is_loading())
            .field("events", &self.collector.len())
            .finish()
    }
}

/// Builds the window settings
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
///
/// # Errors
///
/// Fails when the image loader cannot be built or the event loop cannot
/// start.
pub fn run(flags: Flags) -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_warning) = config::load();
    let loader = Loader::from_config(&config)?;

    // iced 0.14 requires an Fn boot closure; every piece of startup data is
    // cheap to clone (the loader shares its client and cache).
    let startup = Startup {
        flags,
        config,
        config_warning,
        loader,
    };
    let boot = move || App::new(startup.clone());

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()?;
    Ok(())
}

/// Applies CLI flags on top of the configured options. Values that do not
/// parse are reported and skipped.
fn apply_flags(mut options: Options, flags: &Flags, diagnostics: &DiagnosticsHandle) -> Options {
    fn parsed<T>(value: Option<&str>, diagnostics: &DiagnosticsHandle) -> Option<T>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        let value = value?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                diagnostics.warn(format!("ignoring flag value {value:?}: {error}"));
                None
            }
        }
    }

    options.src = flags.src.clone().or(options.src);
    options.srcset = flags.srcset.clone().or(options.srcset);
    options.sizes = flags.sizes.clone().or(options.sizes);
    options.placeholder_src = flags.placeholder.clone().or(options.placeholder_src);

    if let Some(fit) = parsed(flags.fit.as_deref(), diagnostics) {
        options.fit = fit;
    }
    if let Some(position) = parsed(flags.position.as_deref(), diagnostics) {
        options.position = position;
    }
    if let Some(ratio) = parsed(flags.ratio.as_deref(), diagnostics) {
        options.ratio = Some(ratio);
    }
    options.width = parsed::<Dimension>(flags.width.as_deref(), diagnostics).or(options.width);
    options.height = parsed::<Dimension>(flags.height.as_deref(), diagnostics).or(options.height);

    if flags.eager {
        options.loading = Loading::Eager;
    }
    if flags.no_spinner {
        options.no_spinner = true;
    }
    options
}

impl App {
    fn new(startup: Startup) -> (Self, Task<Message>) {
        let Startup {
            flags,
            config,
            config_warning,
            loader,
        } = startup;

        let capacity = config
            .diagnostics
            .buffer_capacity
            .map_or_else(BufferCapacity::default, BufferCapacity::new);
        let collector = DiagnosticsCollector::new(capacity);
        let diagnostics = collector.handle();

        if let Some(key) = config_warning {
            diagnostics.warn(key);
        }

        let options = Options::from_config(&config).unwrap_or_else(|error| {
            diagnostics.warn(format!("invalid settings.toml value: {error}"));
            Options::default()
        });
        let options = apply_flags(options, &flags, &diagnostics);
        let source_input = options.src.clone().unwrap_or_default();

        let (image, task) = lazy_image::State::new(options, loader, diagnostics.clone());

        let app = App {
            image,
            collector,
            diagnostics,
            source_input,
            export_path: flags
                .export_diagnostics
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE)),
            status: None,
        };

        (app, task.map(Message::Image))
    }

    fn title(&self) -> String {
        let app_name = "Lazy Image";
        match self.image.source().and_then(|source| source.src()) {
            Some(src) => format!("{src} - {app_name}"),
            None => app_name.to_string(),
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            self.image.subscription().map(Message::Image),
            iced::time::every(LOG_REFRESH_INTERVAL).map(Message::Tick),
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Image(image_message) => {
                let (effect, task) = self.image.update(image_message);
                self.handle_effect(effect);
                task.map(Message::Image)
            }
            Message::SourceInputChanged(value) => {
                self.source_input = value;
                Task::none()
            }
            Message::SubmitSource => {
                let src = self.source_input.trim();
                let mut options = self.image.options().clone();
                options.src = (!src.is_empty()).then(|| src.to_string());
                options.srcset = None;
                options.sizes = None;
                self.status = None;
                self.image.set_options(options).map(Message::Image)
            }
            Message::ClearSource => {
                self.source_input.clear();
                let options = Options {
                    src: None,
                    srcset: None,
                    sizes: None,
                    ..self.image.options().clone()
                };
                self.status = None;
                self.image.set_options(options).map(Message::Image)
            }
            Message::WindowResized(size) => {
                let viewport = Viewport {
                    width: size.width,
                    ..self.image.viewport()
                };
                self.image.set_viewport(viewport).map(Message::Image)
            }
            Message::Tick(_) => {
                self.collector.process_pending();
                Task::none()
            }
            Message::ExportDiagnostics => {
                self.collector.process_pending();
                self.status = Some(match self.collector.export_to_file(&self.export_path) {
                    Ok(path) => format!("Diagnostics written to {}", path.display()),
                    Err(error) => {
                        self.diagnostics.warn(error.to_string());
                        format!("Export failed: {error}")
                    }
                });
                Task::none()
            }
        }
    }

    fn handle_effect(&mut self, effect: lazy_image::Effect) {
        match effect {
            lazy_image::Effect::None => {}
            lazy_image::Effect::Loaded { url } => {
                self.status = Some(format!("Loaded {url}"));
            }
            lazy_image::Effect::Failed(error) => {
                self.status = Some(error.to_string());
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(view::ViewContext {
            image: &self.image,
            collector: &self.collector,
            source_input: &self.source_input,
            status: self.status.as_deref(),
        })
    }
}
