// SPDX-License-Identifier: MPL-2.0
//! End-to-end load cycles of the lazy image component, driven by messages
//! the way the runtime would deliver them.

use std::thread;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use iced::widget::image::Handle;
use iced_lazy_img::diagnostics::{CancelReason, DiagnosticEventKind, DiagnosticsCollector, DiagnosticsHandle};
use iced_lazy_img::domain::FadeDuration;
use iced_lazy_img::error::LoadError;
use iced_lazy_img::ui::lazy_image::{
    assemble, AspectRatio, Completeness, ContentKind, Effect, ImageSource, Indicator, LayerPhase, Loader,
    ImageLayer, LoaderSettings, Loading, Message, Options, Probe, SlotIndex, State,
};

fn loader() -> Loader {
    Loader::new(LoaderSettings::default()).expect("client should build")
}

fn pixel() -> Handle {
    Handle::from_rgba(1, 1, vec![255; 4])
}

fn mount(options: Options) -> State {
    let (state, _task) = State::new(options.loading(Loading::Eager), loader(), DiagnosticsHandle::default());
    state
}

fn set_src(state: &mut State, src: &str) {
    let _ = state.update(Message::SourceChanged(Some(ImageSource::from_src(src))));
}

fn load_event(state: &mut State, url: &str, width: u32, height: u32, completeness: &Completeness) -> Effect {
    state
        .update(Message::Loaded {
            load_id: state.load_id(),
            result: Ok(Probe {
                natural_width: width,
                natural_height: height,
                current_src: url.to_string(),
                completeness: completeness.clone(),
            }),
        })
        .0
}

fn displayed_layer(state: &State) -> Option<ImageLayer> {
    assemble(state, false)
        .images
        .into_iter()
        .find(|layer| layer.phase == LayerPhase::Loaded)
}

fn short_fades(options: Options) -> Options {
    options
        .image_fade(FadeDuration::from_millis(40))
        .content_fade(FadeDuration::from_millis(40))
}

/// Delivers frames the way the runtime does while the component asks for them.
fn settle(state: &mut State) {
    thread::sleep(Duration::from_millis(60));
    let _ = state.update(Message::Frame(Instant::now()));
}

fn slot_src(state: &State, index: SlotIndex) -> Option<String> {
    state
        .slots()
        .get(index)
        .and_then(|slot| slot.source.src().map(str::to_string))
}

#[test]
fn placeholder_is_shown_on_mount_without_loading() {
    let state = mount(Options::new().placeholder_src("p.jpg"));

    assert_eq!(slot_src(&state, SlotIndex::Second).as_deref(), Some("p.jpg"));
    assert!(state.slots().get(SlotIndex::First).is_none());
    assert!(!state.is_loading());
    assert!(!state.has_error());
}

#[test]
fn load_then_poll_promotes_the_waiting_slot() {
    let mut state = mount(Options::new().placeholder_src("p.jpg"));

    set_src(&mut state, "a.jpg");
    assert!(state.is_loading());
    assert_eq!(slot_src(&state, SlotIndex::First).as_deref(), Some("a.jpg"));

    let completeness = Completeness::pending();
    assert_eq!(load_event(&mut state, "a.jpg", 200, 100, &completeness), Effect::None);
    assert_abs_diff_eq!(state.natural_ratio().value(), 0.5, epsilon = 1e-4);
    assert!(state.is_polling());

    // Still decoding: the tick changes nothing.
    assert_eq!(state.update(Message::PollTick).0, Effect::None);
    assert!(state.is_loading());

    completeness.complete(pixel());
    let (effect, _) = state.update(Message::PollTick);

    assert_eq!(effect, Effect::Loaded { url: "a.jpg".to_string() });
    assert!(!state.is_loading());
    assert!(!state.is_polling());
    assert_eq!(state.slots().waiting(), SlotIndex::Second);
    assert!(state.slots().get(SlotIndex::Second).is_none());
    assert_eq!(slot_src(&state, SlotIndex::First).as_deref(), Some("a.jpg"));
}

#[test]
fn failed_load_clears_both_slots_and_shows_error_content() {
    let mut state = mount(Options::new().placeholder_src("p.jpg"));
    set_src(&mut state, "bad.jpg");

    let (effect, _) = state.update(Message::Loaded {
        load_id: state.load_id(),
        result: Err(LoadError::NotFound("bad.jpg".to_string())),
    });

    assert_eq!(effect, Effect::Failed(LoadError::NotFound("bad.jpg".to_string())));
    assert!(state.slots().is_empty());
    assert!(!state.is_loading());
    assert!(state.has_error());

    let tree = assemble(&state, false);
    assert!(tree.images.is_empty());
    assert!(matches!(tree.content.kind, ContentKind::Content { error: true }));
}

#[test]
fn source_change_mid_poll_drops_the_old_image() {
    let mut collector = DiagnosticsCollector::default();
    let (mut state, _) = State::new(
        Options::new().src("a.jpg").loading(Loading::Eager),
        loader(),
        collector.handle(),
    );

    let first = Completeness::pending();
    let _ = load_event(&mut state, "a.jpg", 200, 100, &first);
    assert!(state.is_polling());

    set_src(&mut state, "b.jpg");
    assert!(!state.is_polling());

    // a.jpg finishes decoding after it was replaced.
    first.complete(pixel());
    assert_eq!(state.update(Message::PollTick).0, Effect::None);
    assert!(state.is_loading());

    let second = Completeness::decoded(pixel());
    let effect = load_event(&mut state, "b.jpg", 100, 100, &second);
    assert_eq!(effect, Effect::Loaded { url: "b.jpg".to_string() });

    collector.process_pending();
    let ready: Vec<_> = collector
        .iter()
        .filter_map(|event| match &event.kind {
            DiagnosticEventKind::Ready { url, .. } => Some(url.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(ready, vec!["b.jpg".to_string()]);
    assert!(collector.iter().any(|event| matches!(
        event.kind,
        DiagnosticEventKind::PollCancelled {
            reason: CancelReason::SourceChanged,
            ..
        }
    )));
}

#[test]
fn empty_source_clears_without_loading() {
    let mut state = mount(Options::new().src("a.jpg").placeholder_src("p.jpg"));
    assert!(state.is_loading());

    let _ = state.update(Message::SourceChanged(None));

    assert!(state.slots().is_empty());
    assert!(!state.is_loading());
    assert!(!state.has_error());
    assert!(state.source().is_none());
}

#[test]
fn no_success_is_reported_after_an_error() {
    let mut state = mount(Options::new().src("a.jpg"));
    let load_id = state.load_id();

    let completeness = Completeness::pending();
    let _ = load_event(&mut state, "a.jpg", 10, 10, &completeness);
    completeness.fail(LoadError::Decode("truncated".to_string()));

    let (effect, _) = state.update(Message::PollTick);
    assert_eq!(effect, Effect::Failed(LoadError::Decode("truncated".to_string())));

    // A duplicate result of the failed cycle arrives late.
    let (late, _) = state.update(Message::Loaded {
        load_id,
        result: Ok(Probe {
            natural_width: 10,
            natural_height: 10,
            current_src: "a.jpg".to_string(),
            completeness: Completeness::decoded(pixel()),
        }),
    });
    assert_eq!(late, Effect::None);
    assert!(state.has_error());
}

#[test]
fn new_source_after_error_recovers() {
    let mut state = mount(Options::new().src("bad.jpg"));
    let _ = state.update(Message::Loaded {
        load_id: state.load_id(),
        result: Err(LoadError::HttpStatus(404)),
    });
    assert!(state.has_error());

    set_src(&mut state, "a.jpg");
    assert!(!state.has_error());
    assert!(state.is_loading());

    let effect = load_event(&mut state, "a.jpg", 4, 3, &Completeness::decoded(pixel()));
    assert_eq!(effect, Effect::Loaded { url: "a.jpg".to_string() });
}

#[test]
fn late_completion_after_a_load_error_stays_silent() {
    let mut state = mount(Options::new().src("a.jpg"));
    let load_id = state.load_id();

    let completeness = Completeness::pending();
    let _ = load_event(&mut state, "a.jpg", 10, 10, &completeness);
    assert!(state.is_polling());

    let (effect, _) = state.update(Message::Loaded {
        load_id,
        result: Err(LoadError::Network("connection reset".to_string())),
    });
    assert_eq!(effect, Effect::Failed(LoadError::Network("connection reset".to_string())));
    assert!(!state.is_polling());

    // The decoder of the failed cycle finishes anyway.
    completeness.complete(pixel());
    let (late, _) = state.update(Message::PollTick);

    assert_eq!(late, Effect::None);
    assert!(!state.is_polling());
    assert!(state.has_error());
    assert!(state.slots().is_empty());
}

#[test]
fn loaded_image_fades_in_after_an_idle_period_without_spinner() {
    let mut state = mount(short_fades(Options::new().src("a.jpg").no_spinner(true)));
    assert!(state.is_animating());
    settle(&mut state);
    assert!(!state.is_animating());

    // No frames are requested while the decoder works.
    thread::sleep(Duration::from_millis(120));
    let effect = load_event(&mut state, "a.jpg", 10, 10, &Completeness::decoded(pixel()));
    assert_eq!(effect, Effect::Loaded { url: "a.jpg".to_string() });

    assert!(state.is_animating());
    assert_abs_diff_eq!(state.image_opacity(), 0.0);

    settle(&mut state);
    assert_abs_diff_eq!(state.image_opacity(), 1.0);
    assert_abs_diff_eq!(state.content_opacity(), 1.0);
    assert!(!state.is_animating());
    assert!(displayed_layer(&state).expect("loaded layer").is_visible());
}

#[test]
fn spinner_keeps_frames_coming_until_the_fades_finish() {
    let mut state = mount(short_fades(Options::new().src("a.jpg")));
    settle(&mut state);
    assert_abs_diff_eq!(state.content_opacity(), 1.0);
    // The spinner is still turning.
    assert!(state.is_animating());

    let completeness = Completeness::pending();
    let _ = load_event(&mut state, "a.jpg", 10, 10, &completeness);
    thread::sleep(Duration::from_millis(120));
    completeness.complete(pixel());
    let (effect, _) = state.update(Message::PollTick);
    assert_eq!(effect, Effect::Loaded { url: "a.jpg".to_string() });

    // Spinner gone, both fades start over.
    assert!(state.is_animating());
    assert_abs_diff_eq!(state.image_opacity(), 0.0);
    assert!(state.content_opacity() < 0.1);

    settle(&mut state);
    assert!(!state.is_animating());
    assert_abs_diff_eq!(state.image_opacity(), 1.0);
    assert!(displayed_layer(&state).expect("loaded layer").is_visible());
}

#[test]
fn render_tree_reserves_space_from_natural_ratio() {
    let mut state = mount(Options::new().src("a.jpg"));
    let _ = load_event(&mut state, "a.jpg", 200, 100, &Completeness::decoded(pixel()));

    let tree = assemble(&state, false);
    let filler = tree.filler.expect("ratio filler");
    assert_abs_diff_eq!(filler.padding_percent, 50.0, epsilon = 1e-4);
    assert_eq!(tree.images.len(), 1);
    assert_eq!(tree.images[0].phase, LayerPhase::Loaded);
    assert!(matches!(tree.content.kind, ContentKind::Content { error: false }));
}

#[test]
fn explicit_ratio_wins_over_natural_size() {
    let ratio = AspectRatio::new(2.0).expect("valid ratio");
    let mut state = mount(Options::new().src("a.jpg").ratio(ratio));
    let _ = load_event(&mut state, "a.jpg", 100, 300, &Completeness::decoded(pixel()));

    let filler = state.ratio_style().expect("ratio filler");
    assert_abs_diff_eq!(filler.padding_percent, 50.0, epsilon = 1e-4);
}

#[test]
fn spinner_shows_while_loading_unless_suppressed() {
    let state = mount(Options::new().src("a.jpg"));
    assert!(matches!(
        assemble(&state, false).content.kind,
        ContentKind::Loading(Indicator::Spinner { .. })
    ));
    assert!(matches!(
        assemble(&state, true).content.kind,
        ContentKind::Loading(Indicator::Custom)
    ));

    let quiet = mount(Options::new().src("a.jpg").no_spinner(true));
    assert!(matches!(
        assemble(&quiet, false).content.kind,
        ContentKind::Loading(Indicator::Nothing)
    ));
}

#[tokio::test]
async fn loader_probe_feeds_a_full_cycle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("a.png");
    image_rs::RgbaImage::from_pixel(8, 4, image_rs::Rgba([10, 20, 30, 255]))
        .save(&path)
        .expect("write png");
    let url = path.to_string_lossy().into_owned();

    let shared = loader();
    let (mut state, _) = State::new(
        Options::new().src(url.clone()).loading(Loading::Eager),
        shared.clone(),
        DiagnosticsHandle::default(),
    );

    let probe = shared
        .probe(iced_lazy_img::ui::lazy_image::LoadRequest {
            url: url.clone(),
            crossorigin: None,
        })
        .await
        .expect("probe should succeed");
    assert_eq!((probe.natural_width, probe.natural_height), (8, 4));

    let completeness = probe.completeness.clone();
    let mut effect = state
        .update(Message::Loaded {
            load_id: state.load_id(),
            result: Ok(probe),
        })
        .0;

    for _ in 0..200 {
        if effect != Effect::None {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        effect = state.update(Message::PollTick).0;
    }

    assert!(completeness.is_complete());
    assert_eq!(effect, Effect::Loaded { url });
    assert_abs_diff_eq!(state.natural_ratio().value(), 0.5, epsilon = 1e-4);
}
