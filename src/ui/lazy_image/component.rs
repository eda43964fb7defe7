// SPDX-License-Identifier: MPL-2.0
//! The lazy image component: source resolution, the load cycle state
//! machine and its timers.
//!
//! A load cycle goes `Empty -> Loading -> {Ready, Error}`. Any source
//! change re-enters `Loading` (or `Empty`) from whatever state the
//! component is in. Every cycle carries a [`LoadId`]; loader results and
//! poll outcomes from an older cycle are dropped, so a replaced source can
//! never report.

use std::time::{Duration, Instant};

use iced::widget::image::Handle;
use iced::{Subscription, Task};

use super::loader::{LoadRequest, Loader, Probe};
use super::options::{Loading, Options};
use super::poller::{LoadId, PollStatus, Poller};
use super::ratio::{self, NaturalRatio, RatioStyle};
use super::slots::{SlotBuffer, SlotIndex};
use super::source::{ImageSource, Viewport};
use super::transition::Fade;
use crate::diagnostics::{CancelReason, DiagnosticEventKind, DiagnosticsHandle};
use crate::error::LoadError;

/// Interval of the animation tick driving fades and the spinner.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Spinner rotation speed in radians per frame.
const SPINNER_SPEED: f32 = 0.1;

#[derive(Debug, Clone)]
pub enum Message {
    /// New `{src, srcset, sizes}` from the host; `None` is the empty source.
    SourceChanged(Option<ImageSource>),
    /// The widget scrolled into view (releases a lazy fetch).
    Revealed,
    /// The load event of the waiting image, or its error.
    Loaded {
        load_id: LoadId,
        result: Result<Probe, LoadError>,
    },
    /// Completeness poll timer.
    PollTick,
    PlaceholderDecoded {
        source: ImageSource,
        result: Result<Handle, LoadError>,
    },
    /// Animation tick.
    Frame(Instant),
    Unmount,
}

/// Events for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// The waiting image became complete. Carries the resolved URL.
    Loaded { url: String },
    /// The load cycle failed.
    Failed(LoadError),
}

#[derive(Debug, Clone)]
pub struct State {
    options: Options,
    source: Option<ImageSource>,
    viewport: Viewport,
    slots: SlotBuffer,
    poller: Poller,
    natural_ratio: NaturalRatio,
    is_loading: bool,
    has_error: bool,
    load_id: LoadId,
    /// URL of the in-flight load, reported with `Effect::Loaded`.
    pending_url: Option<String>,
    /// Fetch held back by the lazy loading hint.
    deferred: Option<LoadRequest>,
    revealed: bool,
    image_fade: Fade,
    content_fade: Fade,
    last_frame: Instant,
    spinner_rotation: f32,
    unmounted: bool,
    loader: Loader,
    diagnostics: DiagnosticsHandle,
}

impl State {
    /// Mounts the component.
    ///
    /// The placeholder, if any, is shown right away; the returned task
    /// decodes it and starts the first load.
    #[must_use]
    pub fn new(options: Options, loader: Loader, diagnostics: DiagnosticsHandle) -> (Self, Task<Message>) {
        let placeholder = options
            .placeholder_src
            .as_deref()
            .and_then(|src| ImageSource::resolve(Some(src), None, None));

        let mut state = Self {
            slots: SlotBuffer::new(placeholder.clone()),
            poller: Poller::new(options.poll_interval),
            image_fade: Fade::new(options.image_fade),
            content_fade: Fade::new(options.content_fade),
            source: None,
            viewport: Viewport::default(),
            natural_ratio: NaturalRatio::default(),
            is_loading: false,
            has_error: false,
            load_id: LoadId::default(),
            pending_url: None,
            deferred: None,
            revealed: false,
            last_frame: Instant::now(),
            spinner_rotation: 0.0,
            unmounted: false,
            options,
            loader,
            diagnostics,
        };

        // Content layer "appears" on mount.
        state.content_fade.restart(state.last_frame);

        let placeholder_task = placeholder.map_or_else(Task::none, |source| state.decode_placeholder(source));
        // Mounting without a source keeps the placeholder; only a later
        // change to "no source" clears both slots.
        let load_task = match state.options.source() {
            Some(source) => state.add_image(Some(source)),
            None => Task::none(),
        };

        (state, Task::batch([placeholder_task, load_task]))
    }

    pub fn update(&mut self, message: Message) -> (Effect, Task<Message>) {
        if self.unmounted {
            return (Effect::None, Task::none());
        }

        match message {
            Message::SourceChanged(source) => (Effect::None, self.add_image(source)),
            Message::Revealed => (Effect::None, self.reveal()),
            Message::Loaded { load_id, result } => (self.on_loaded(load_id, result), Task::none()),
            Message::PollTick => {
                let status = self.poller.tick();
                (self.on_poll_status(status), Task::none())
            }
            Message::PlaceholderDecoded { source, result } => {
                self.on_placeholder_decoded(&source, result);
                (Effect::None, Task::none())
            }
            Message::Frame(now) => {
                self.last_frame = self.last_frame.max(now);
                if self.is_loading {
                    self.spinner_rotation += SPINNER_SPEED;
                    if self.spinner_rotation > std::f32::consts::TAU {
                        self.spinner_rotation -= std::f32::consts::TAU;
                    }
                }
                (Effect::None, Task::none())
            }
            Message::Unmount => {
                self.unmount();
                (Effect::None, Task::none())
            }
        }
    }

    /// Replaces the options.
    ///
    /// A new load cycle starts only when `{src, srcset, sizes}` changed by
    /// value; everything else just restyles the current state.
    #[must_use]
    pub fn set_options(&mut self, options: Options) -> Task<Message> {
        if self.unmounted {
            return Task::none();
        }

        let source = options.source();
        self.poller.set_interval(options.poll_interval);
        self.image_fade.set_duration(options.image_fade);
        self.content_fade.set_duration(options.content_fade);
        let eager_now = options.loading == Loading::Eager && self.options.loading == Loading::Lazy;
        self.options = options;

        if source != self.source {
            self.add_image(source)
        } else if eager_now {
            self.reveal()
        } else {
            Task::none()
        }
    }

    /// Updates display metrics; re-resolves a `srcset` source whose
    /// selected candidate changed.
    #[must_use]
    pub fn set_viewport(&mut self, viewport: Viewport) -> Task<Message> {
        let previous = self.viewport;
        self.viewport = viewport;

        if self.unmounted {
            return Task::none();
        }
        let candidate_changed = self.source.as_ref().is_some_and(|source| {
            source.srcset().is_some() && source.current_src(previous) != source.current_src(viewport)
        });
        if candidate_changed {
            self.add_image(self.source.clone())
        } else {
            Task::none()
        }
    }

    /// Tears the component down. Nothing is reported afterwards.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.cancel_poll(CancelReason::Unmount);
        self.deferred = None;
        self.pending_url = None;
        self.load_id = self.load_id.next();
        self.unmounted = true;
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.unmounted {
            return Subscription::none();
        }

        let mut subscriptions = Vec::new();

        if self.poller.is_active() {
            subscriptions.push(iced::time::every(self.poller.interval().as_duration()).map(|_| Message::PollTick));
        }

        if self.is_animating() {
            subscriptions.push(iced::time::every(FRAME_INTERVAL).map(Message::Frame));
        }

        Subscription::batch(subscriptions)
    }

    // -------------------------------------------------------------------------
    // Load cycle
    // -------------------------------------------------------------------------

    fn add_image(&mut self, source: Option<ImageSource>) -> Task<Message> {
        self.cancel_poll(CancelReason::SourceChanged);
        self.has_error = false;
        self.deferred = None;
        self.pending_url = None;
        self.load_id = self.load_id.next();
        self.source = source.clone();

        let Some(source) = source else {
            self.diagnostics
                .log(DiagnosticEventKind::SourceChanged { url: None });
            self.set_loading(false);
            self.slots.clear();
            return Task::none();
        };

        let url = source.current_src(self.viewport);
        self.diagnostics.log(DiagnosticEventKind::SourceChanged { url: url.clone() });
        self.set_loading(true);
        self.slots.put_waiting(source);

        let Some(url) = url else {
            // `sizes` alone: the waiting image never fires a load event.
            self.diagnostics.warn("source has sizes but neither src nor srcset");
            return Task::none();
        };

        let request = LoadRequest {
            url,
            crossorigin: self.options.crossorigin,
        };

        if self.options.loading == Loading::Lazy && !self.revealed {
            self.diagnostics.log(DiagnosticEventKind::LoadDeferred {
                load_id: self.load_id.value(),
            });
            self.deferred = Some(request);
            return Task::none();
        }

        self.fetch(request)
    }

    fn reveal(&mut self) -> Task<Message> {
        self.revealed = true;
        match self.deferred.take() {
            Some(request) => self.fetch(request),
            None => Task::none(),
        }
    }

    fn fetch(&mut self, request: LoadRequest) -> Task<Message> {
        let load_id = self.load_id;
        self.diagnostics.log(DiagnosticEventKind::LoadStarted {
            load_id: load_id.value(),
            url: request.url.clone(),
        });
        self.pending_url = Some(request.url.clone());

        let loader = self.loader.clone();
        Task::perform(loader.probe(request), move |result| Message::Loaded { load_id, result })
    }

    fn on_loaded(&mut self, load_id: LoadId, result: Result<Probe, LoadError>) -> Effect {
        if load_id != self.load_id {
            return Effect::None;
        }

        match result {
            Ok(probe) => {
                self.natural_ratio = NaturalRatio::from_size(probe.natural_width, probe.natural_height);
                self.diagnostics.log(DiagnosticEventKind::NaturalSize {
                    load_id: load_id.value(),
                    width: probe.natural_width,
                    height: probe.natural_height,
                });
                self.pending_url = Some(probe.current_src);

                let status = self.poller.start(load_id, probe.completeness);
                if matches!(status, PollStatus::Waiting) {
                    self.diagnostics.log(DiagnosticEventKind::PollStarted {
                        load_id: load_id.value(),
                    });
                }
                self.on_poll_status(status)
            }
            Err(error) => self.on_error(error),
        }
    }

    fn on_poll_status(&mut self, status: PollStatus) -> Effect {
        match status {
            PollStatus::Idle | PollStatus::Waiting => Effect::None,
            PollStatus::Ready { load_id, .. } | PollStatus::Failed { load_id, .. }
                if load_id != self.load_id =>
            {
                Effect::None
            }
            PollStatus::Ready { handle, polls, .. } => self.on_ready(handle, polls),
            PollStatus::Failed { error, .. } => self.on_error(error),
        }
    }

    fn on_ready(&mut self, handle: Handle, polls: u32) -> Effect {
        let waiting = self.slots.waiting();
        if let Some(source) = self.slots.get(waiting).map(|slot| slot.source.clone()) {
            self.slots.attach_decoded(waiting, &source, handle);
        }
        self.slots.promote();
        self.has_error = false;
        self.set_loading(false);
        let now = self.touch_clock();
        self.image_fade.restart(now);

        let url = self.pending_url.take().unwrap_or_default();
        self.diagnostics.log(DiagnosticEventKind::Ready {
            load_id: self.load_id.value(),
            url: url.clone(),
            polls,
        });
        Effect::Loaded { url }
    }

    fn on_error(&mut self, error: LoadError) -> Effect {
        self.cancel_poll(CancelReason::Error);
        self.pending_url = None;
        self.has_error = true;
        self.slots.clear();
        self.set_loading(false);
        self.diagnostics.log(DiagnosticEventKind::Failed {
            load_id: self.load_id.value(),
            message: error.to_string(),
        });
        // Results still in flight for this cycle must not report again.
        self.load_id = self.load_id.next();
        Effect::Failed(error)
    }

    fn cancel_poll(&mut self, reason: CancelReason) {
        if let Some(load_id) = self.poller.cancel() {
            self.diagnostics.log(DiagnosticEventKind::PollCancelled {
                load_id: load_id.value(),
                reason,
            });
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.is_loading != loading {
            // The content layer switches between loading and content.
            let now = self.touch_clock();
            self.content_fade.restart(now);
        }
        self.is_loading = loading;
        if !loading {
            self.spinner_rotation = 0.0;
        }
    }

    /// Moves the frame clock to the present. Fades start here so the first
    /// frame after an idle period begins at opacity 0, not at the end.
    fn touch_clock(&mut self) -> Instant {
        self.last_frame = self.last_frame.max(Instant::now());
        self.last_frame
    }

    fn decode_placeholder(&self, source: ImageSource) -> Task<Message> {
        let Some(url) = source.current_src(self.viewport) else {
            return Task::none();
        };
        let loader = self.loader.clone();
        Task::perform(loader.placeholder(url), move |result| Message::PlaceholderDecoded {
            source,
            result,
        })
    }

    fn on_placeholder_decoded(&mut self, source: &ImageSource, result: Result<Handle, LoadError>) {
        match result {
            Ok(handle) => {
                for index in [SlotIndex::First, SlotIndex::Second] {
                    let undecoded = self.slots.get(index).is_some_and(|slot| slot.handle.is_none());
                    if undecoded && self.slots.attach_decoded(index, source, handle.clone()) {
                        break;
                    }
                }
            }
            Err(error) => self.diagnostics.warn(format!("placeholder failed: {error}")),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn slots(&self) -> &SlotBuffer {
        &self.slots
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    #[must_use]
    pub fn natural_ratio(&self) -> NaturalRatio {
        self.natural_ratio
    }

    #[must_use]
    pub fn ratio_style(&self) -> Option<RatioStyle> {
        ratio::ratio_style(
            self.options.ratio,
            self.options.width,
            self.options.height,
            self.natural_ratio,
        )
    }

    /// Id of the current load cycle, as carried by `Message::Loaded`.
    #[must_use]
    pub fn load_id(&self) -> LoadId {
        self.load_id
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Whether a fetch is held back until `Message::Revealed`.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    #[must_use]
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    #[must_use]
    pub fn spinner_rotation(&self) -> f32 {
        self.spinner_rotation
    }

    /// Whether the next frame looks different from the last one drawn.
    ///
    /// Measured on the frame clock that opacities are read from, so a fade
    /// keeps receiving frames until it has actually been drawn opaque.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        let spinner_visible = self.is_loading && !self.options.no_spinner;
        spinner_visible
            || self.image_fade.is_running(self.last_frame)
            || self.content_fade.is_running(self.last_frame)
    }

    /// Opacity of image layers in the displayed slot.
    #[must_use]
    pub fn image_opacity(&self) -> f32 {
        self.image_fade.opacity_at(self.last_frame)
    }

    #[must_use]
    pub fn content_opacity(&self) -> f32 {
        self.content_fade.opacity_at(self.last_frame)
    }
}
