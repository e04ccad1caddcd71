use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gobj::{
    Attachable, CollectingReporter, Detector, DetectorConfig, Graphics, HostResource, NullHost,
    ResourceKind, ScriptTable, SourceUnit, Tracker,
};
use gobj_examples::host::{DemoGraphics, DemoHost, DemoSprite, DemoViewport, DemoWindow};

/// A host object the host can free on its own, behind the wrapper's back.
struct HostOwned<const VIEWPORT: bool> {
    freed: Arc<AtomicBool>,
    release_calls: usize,
}

impl<const VIEWPORT: bool> HostOwned<VIEWPORT> {
    fn new() -> (Self, Arc<AtomicBool>) {
        let freed = Arc::new(AtomicBool::new(false));
        let resource = Self {
            freed: freed.clone(),
            release_calls: 0,
        };
        (resource, freed)
    }
}

impl<const VIEWPORT: bool> HostResource for HostOwned<VIEWPORT> {
    const KIND: ResourceKind = if VIEWPORT {
        ResourceKind::Viewport
    } else {
        ResourceKind::Sprite
    };

    fn release(&mut self) {
        self.release_calls += 1;
        self.freed.store(true, Ordering::SeqCst);
    }

    fn is_released(&self) -> bool {
        self.freed.load(Ordering::SeqCst)
    }

    fn is_visible(&self) -> bool {
        true
    }

    fn set_visible(&mut self, _visible: bool) {}
}

impl Attachable<HostOwned<true>> for HostOwned<false> {
    fn set_container(&mut self, _container: Option<&HostOwned<true>>) {}
}

/// A host whose visibility setter refuses to hide the resource.
#[derive(Default)]
struct AlwaysShown {
    released: bool,
}

impl HostResource for AlwaysShown {
    const KIND: ResourceKind = ResourceKind::Window;

    fn release(&mut self) {
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn is_visible(&self) -> bool {
        true
    }

    fn set_visible(&mut self, _visible: bool) {}
}

fn tracker() -> (Tracker, CollectingReporter) {
    let collector = CollectingReporter::new();
    let detector = Detector::with_reporters(
        DetectorConfig {
            notify_on_console: false,
            ..DetectorConfig::default()
        },
        ScriptTable::default(),
        vec![Box::new(collector.clone())],
    );
    (Tracker::new(Arc::new(detector), Arc::new(NullHost)), collector)
}

#[test]
fn dropping_a_wrapper_finalizes_after_the_host_resource() {
    let (tracker, collector) = tracker();
    let sprite = tracker.track(DemoSprite::new("a"));
    let id = sprite.id().expect("tracked");
    assert!(tracker.detector().is_tracked(id));

    drop(sprite);
    assert!(!tracker.detector().is_tracked(id));
    assert_eq!(tracker.detector().queued_count(), 1);
    assert!(collector.reports().is_empty());

    let mut graphics = tracker.graphics(DemoGraphics::default());
    graphics.update();
    assert_eq!(graphics.get().frames, 1);
    assert_eq!(collector.reports().len(), 1);
    assert_eq!(collector.reports()[0].id(), id);
}

#[test]
fn dispose_is_idempotent_and_never_reported() {
    let (tracker, collector) = tracker();
    let mut window = tracker.track(DemoWindow::new("w"));
    let id = window.id().expect("tracked");

    window.dispose();
    window.dispose();
    assert!(window.is_disposed());
    assert!(window.get().surface.released);
    assert!(!tracker.detector().is_tracked(id));

    drop(window);
    assert!(tracker.detector().drain().is_empty());
    assert!(collector.reports().is_empty());
}

#[test]
fn dispose_after_the_host_freed_the_resource_is_never_reported() {
    let (tracker, collector) = tracker();
    let (resource, freed) = HostOwned::<false>::new();
    let mut sprite = tracker.track(resource);
    let id = sprite.id().expect("tracked");

    freed.store(true, Ordering::SeqCst);
    assert!(sprite.is_disposed());
    sprite.dispose();
    assert_eq!(sprite.get().release_calls, 0, "host release is not repeated");
    assert!(!tracker.detector().is_tracked(id));

    drop(sprite);
    assert!(tracker.detector().drain().is_empty());
    assert!(collector.reports().is_empty());
    assert_eq!(tracker.detector().live_count(), 0);
}

#[test]
fn container_dispose_after_the_host_freed_it_releases_its_members() {
    let (tracker, collector) = tracker();
    let (resource, freed) = HostOwned::<true>::new();
    let mut viewport = tracker.track_container(resource);
    let viewport_id = viewport.id().expect("tracked");
    let (member, _) = HostOwned::<false>::new();
    let sprite = tracker.track_in(member, &viewport);
    let sprite_id = sprite.id().expect("tracked");
    assert_eq!(tracker.detector().members_of(viewport_id), vec![sprite_id]);

    freed.store(true, Ordering::SeqCst);
    viewport.dispose();
    assert!(!tracker.detector().is_tracked(viewport_id));
    assert!(!tracker.detector().is_tracked(sprite_id));

    drop(viewport);
    drop(sprite);
    assert!(tracker.detector().drain().is_empty());
    assert!(collector.reports().is_empty());
}

#[test]
fn exempt_wrapper_is_never_reported() {
    let (tracker, _) = tracker();
    let mut sprite = tracker.track(DemoSprite::new("cursor"));
    assert!(sprite.exempt());
    assert!(!sprite.is_disposed());
    drop(sprite);
    assert!(tracker.detector().drain().is_empty());
}

#[test]
fn already_released_resources_are_not_tracked() {
    let (tracker, _) = tracker();
    let mut released = DemoSprite::new("stale");
    released.surface.released = true;
    let sprite = tracker.track(released);
    assert_eq!(sprite.id(), None);
    assert_eq!(tracker.detector().live_count(), 0);
    drop(sprite);
    assert_eq!(tracker.detector().queued_count(), 0);
}

#[test]
fn creation_trace_falls_back_to_the_rust_call_site() {
    let (tracker, _) = tracker();
    let sprite = tracker.track(DemoSprite::new("a"));
    let record = tracker
        .detector()
        .record(sprite.id().expect("tracked"))
        .expect("live");

    assert_eq!(record.scene.as_str(), "NoScene");
    assert_eq!(record.trace.frames.len(), 1);
    match &record.trace.frames[0].unit {
        SourceUnit::Path(path) => assert!(path.ends_with("wrappers.rs"), "got {path}"),
        other => panic!("expected a path frame, got {other:?}"),
    }
}

#[test]
fn initial_host_state_seeds_the_visibility_flags() {
    let (tracker, _) = tracker();
    let mut hidden = DemoSprite::new("hidden");
    hidden.surface.visible = false;
    hidden.surface.opacity = 0;
    let sprite = tracker.track(hidden);

    let record = tracker
        .detector()
        .record(sprite.id().expect("tracked"))
        .expect("live");
    assert!(!record.visibility.self_visible);
    assert!(!record.visibility.opaque);
    assert!(record.visibility.container_visible);
}

#[test]
fn wrapper_mirrors_visibility_and_opacity_into_the_record() {
    let (tracker, _) = tracker();
    let mut sprite = tracker.track(DemoSprite::new("a"));
    let id = sprite.id().expect("tracked");

    sprite.set_visible(false);
    sprite.set_opacity(0);
    assert!(!sprite.get().surface.visible);
    let visibility = tracker.detector().record(id).expect("live").visibility;
    assert!(!visibility.self_visible);
    assert!(!visibility.opaque);

    sprite.set_visible(true);
    sprite.set_opacity(1);
    assert!(tracker.detector().record(id).expect("live").visibility.is_shown());
}

#[test]
fn record_follows_the_host_state_when_a_setter_is_ignored() {
    let (tracker, _) = tracker();
    let mut window = tracker.track(AlwaysShown::default());
    let id = window.id().expect("tracked");

    window.set_visible(false);
    assert!(window.get().is_visible());
    assert!(tracker.detector().record(id).expect("live").visibility.self_visible);
    window.dispose();
}

#[test]
fn attaching_moves_members_between_containers() {
    let (tracker, _) = tracker();
    let first = tracker.track_container(DemoViewport::new("first"));
    let second = tracker.track_container(DemoViewport::new("second"));
    let mut sprite = tracker.track_in(DemoSprite::new("a"), &first);
    let id = sprite.id().expect("tracked");
    let first_id = first.id().expect("tracked");
    let second_id = second.id().expect("tracked");

    assert_eq!(sprite.get().viewport.as_deref(), Some("first"));
    assert_eq!(tracker.detector().members_of(first_id), vec![id]);

    sprite.set_container(Some(&second));
    assert_eq!(sprite.get().viewport.as_deref(), Some("second"));
    assert!(tracker.detector().members_of(first_id).is_empty());
    assert_eq!(tracker.detector().members_of(second_id), vec![id]);

    sprite.set_container::<DemoViewport>(None);
    assert_eq!(sprite.get().viewport, None);
    assert!(tracker.detector().members_of(second_id).is_empty());
}

#[test]
fn attaching_to_a_disposed_container_detaches() {
    let (tracker, _) = tracker();
    let mut viewport = tracker.track_container(DemoViewport::new("gone"));
    viewport.dispose();

    let sprite = tracker.track_in(DemoSprite::new("a"), &viewport);
    assert_eq!(sprite.get().viewport, None);
    let record = tracker
        .detector()
        .record(sprite.id().expect("tracked"))
        .expect("live");
    assert_eq!(record.container, None);
    assert!(record.visibility.container_visible);
}

#[test]
fn attaching_to_a_hidden_container_copies_its_visibility() {
    let (tracker, _) = tracker();
    let mut viewport = tracker.track_container(DemoViewport::new("dim"));
    viewport.set_visible(false);

    let sprite = tracker.track_in(DemoSprite::new("a"), &viewport);
    let record = tracker
        .detector()
        .record(sprite.id().expect("tracked"))
        .expect("live");
    assert!(!record.visibility.container_visible);

    viewport.set_visible(true);
    let record = tracker
        .detector()
        .record(sprite.id().expect("tracked"))
        .expect("live");
    assert!(record.visibility.container_visible);
}

#[test]
fn dropping_an_undisposed_container_reports_it_and_orphans_members() {
    let (tracker, collector) = tracker();
    let viewport = tracker.track_container(DemoViewport::new("leaky"));
    let sprite = tracker.track_in(DemoSprite::new("a"), &viewport);
    let sprite_id = sprite.id().expect("tracked");

    drop(viewport);
    let record = tracker.detector().record(sprite_id).expect("member still live");
    assert_eq!(record.container, None);

    tracker.detector().drain();
    let kinds: Vec<_> = collector.reports().iter().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![ResourceKind::Viewport]);
    drop(sprite);
}

#[test]
fn activation_installs_the_process_wide_detector() {
    let path = std::env::temp_dir().join(format!("gobj-activation-{}.txt", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let host = Arc::new(DemoHost::new(["Main", "Scene_Map", "Spriteset_Map"]));
    let tracker = Tracker::activate(
        DetectorConfig {
            notify_on_console: false,
            write_log_file: true,
            log_path: path.clone(),
            ..DetectorConfig::default()
        },
        host.clone(),
    );
    let active = gobj::active().expect("activated");
    assert!(Arc::ptr_eq(&active, tracker.detector()));

    host.enter_scene("Scene_Map");
    host.set_stack(["{2}:118:in `create_pictures'"]);
    drop(tracker.track(DemoSprite::new("picture")));

    let mut graphics = Graphics::new(DemoGraphics::default());
    graphics.update();
    assert_eq!(graphics.get().frames, 1);

    let contents = std::fs::read_to_string(&path).expect("log file written");
    assert!(contents.starts_with("\n-----\nTime: "), "got {contents:?}");
    assert!(contents.contains("\nMemory Leak Sprite\nIn Scene Scene_Map\nCreation Stack:: \n"));
    assert!(contents.ends_with("Script 2 -- Spriteset_Map, Line: 118:in `create_pictures'"));
    let _ = std::fs::remove_file(&path);
}
