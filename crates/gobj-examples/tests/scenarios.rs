use std::sync::Arc;

use gobj::{
    CollectingReporter, ContainerPolicy, Detector, DetectorConfig, HostContext, ResourceKind,
    ScriptTable, Tracker,
};
use gobj_examples::host::DemoHost;
use gobj_examples::scenarios;

struct Stage {
    tracker: Tracker,
    host: Arc<DemoHost>,
    collector: CollectingReporter,
}

impl Stage {
    fn new(config: DetectorConfig) -> Self {
        let host = Arc::new(DemoHost::new([
            "Main",
            "Scene_Map",
            "Spriteset_Map",
            "Scene_Battle",
        ]));
        let collector = CollectingReporter::new();
        let detector = Detector::with_reporters(
            config,
            ScriptTable::from_names(host.loaded_scripts()),
            vec![Box::new(collector.clone())],
        );
        let tracker = Tracker::new(Arc::new(detector), host.clone());
        Self {
            tracker,
            host,
            collector,
        }
    }

    fn kinds(&self) -> Vec<ResourceKind> {
        self.collector
            .reports()
            .iter()
            .map(|report| report.kind())
            .collect()
    }

    fn detector(&self) -> &Detector {
        self.tracker.detector()
    }
}

fn config() -> DetectorConfig {
    DetectorConfig {
        notify_on_console: false,
        write_log_file: true,
        ..DetectorConfig::default()
    }
}

#[test]
fn forgotten_sprite_is_reported_with_scene_and_creation_stack() {
    let stage = Stage::new(config());
    scenarios::forgotten_sprite::run(&stage.tracker, &stage.host).expect("scenario runs");

    let reports = stage.collector.reports();
    assert_eq!(reports.len(), 1);
    let leak = &reports[0];
    assert_eq!(leak.kind(), ResourceKind::Sprite);
    assert_eq!(leak.scene().as_str(), "Scene_Map");

    let frames: Vec<String> = leak
        .record
        .trace
        .frames
        .iter()
        .map(|frame| stage.detector().scripts().render(frame))
        .collect();
    assert_eq!(
        frames,
        vec![
            "Script 2 -- Spriteset_Map, Line: 118:in `create_pictures'".to_string(),
            "Script 1 -- Scene_Map, Line: 40:in `start'".to_string(),
        ]
    );

    assert_eq!(stage.collector.batch_sizes(), vec![1]);
    assert_eq!(stage.detector().live_count(), 0);
}

#[test]
fn abridged_trace_keeps_only_the_call_site() {
    let stage = Stage::new(DetectorConfig {
        abridged_trace: true,
        ..config()
    });
    scenarios::forgotten_sprite::run(&stage.tracker, &stage.host).expect("scenario runs");

    let reports = stage.collector.reports();
    assert_eq!(reports[0].record.trace.label(), "Point");
    assert_eq!(reports[0].record.trace.frames.len(), 1);
}

#[test]
fn disposed_viewport_takes_its_members_with_it() {
    let stage = Stage::new(config());
    scenarios::viewport_auto_release::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert!(stage.collector.reports().is_empty());
    assert_eq!(stage.detector().live_count(), 0);
}

#[test]
fn mark_invisible_policy_reports_members_without_filtering() {
    let stage = Stage::new(DetectorConfig {
        container_policy: ContainerPolicy::MarkInvisible,
        ..config()
    });
    scenarios::viewport_auto_release::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert_eq!(stage.kinds(), vec![ResourceKind::Sprite, ResourceKind::Tilemap]);
    for report in stage.collector.reports() {
        assert_eq!(report.record.container, None);
        assert!(!report.record.visibility.container_visible);
    }
}

#[test]
fn mark_invisible_policy_with_filtering_reports_nothing() {
    let stage = Stage::new(DetectorConfig {
        container_policy: ContainerPolicy::MarkInvisible,
        filter_invisible_or_transparent: true,
        ..config()
    });
    scenarios::viewport_auto_release::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert!(stage.collector.reports().is_empty());
    assert_eq!(stage.detector().live_count(), 0);
}

#[test]
fn hidden_leaks_are_filtered() {
    let stage = Stage::new(DetectorConfig {
        filter_invisible_or_transparent: true,
        ..config()
    });
    scenarios::hidden_sprite::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert!(stage.collector.reports().is_empty());
    assert_eq!(stage.detector().live_count(), 0);
}

#[test]
fn hidden_leaks_are_reported_without_filtering() {
    let stage = Stage::new(config());
    scenarios::hidden_sprite::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert_eq!(
        stage.kinds(),
        vec![ResourceKind::Plane, ResourceKind::Window, ResourceKind::Sprite]
    );
    let reports = stage.collector.reports();
    assert!(!reports[0].record.visibility.container_visible);
    assert!(!reports[1].record.visibility.opaque);
    assert!(!reports[2].record.visibility.self_visible);
}

#[test]
fn shared_plane_is_reported_after_the_last_owner_drops_it() {
    let stage = Stage::new(config());
    scenarios::shared_plane::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert_eq!(stage.kinds(), vec![ResourceKind::Plane]);
    assert_eq!(stage.collector.batch_sizes(), vec![1]);
    assert_eq!(stage.collector.reports()[0].scene().as_str(), "Scene_Title");
}

#[test]
fn disposed_window_is_never_reported() {
    let stage = Stage::new(config());
    scenarios::disposed_window::run(&stage.tracker, &stage.host).expect("scenario runs");

    assert!(stage.collector.reports().is_empty());
    assert_eq!(stage.detector().live_count(), 0);
}

#[test]
fn silent_configuration_tracks_nothing() {
    let stage = Stage::new(config());
    let silent = Tracker::new(
        Arc::new(Detector::new(
            DetectorConfig {
                notify_on_console: false,
                write_log_file: false,
                ..DetectorConfig::default()
            },
            ScriptTable::default(),
        )),
        stage.host.clone(),
    );
    scenarios::forgotten_sprite::run(&silent, &stage.host).expect("scenario runs");
    assert_eq!(silent.detector().live_count(), 0);
    assert_eq!(silent.detector().queued_count(), 0);
}
