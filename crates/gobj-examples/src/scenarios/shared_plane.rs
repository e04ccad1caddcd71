use std::sync::Arc;

use gobj::{ResourceKind, Tracker};
use tracing::info;

use crate::host::{DemoGraphics, DemoHost, DemoPlane};

/// A plane shared between two owners; the last owner drops it undisposed.
pub fn run(tracker: &Tracker, host: &DemoHost) -> Result<(), String> {
    let mut graphics = tracker.graphics(DemoGraphics::default());
    host.enter_scene("Scene_Title");

    let plane = Arc::new(DemoPlane::new("parallax"));
    let id = tracker.track_shared(ResourceKind::Plane, &plane);
    let second_owner = Arc::clone(&plane);

    drop(plane);
    graphics.update();
    info!(?id, "first owner gone, plane still reachable");

    drop(second_owner);
    graphics.update();
    info!(frames = graphics.get().frames, "shared plane scenario done");
    Ok(())
}
