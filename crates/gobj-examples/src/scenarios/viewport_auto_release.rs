use gobj::Tracker;
use tracing::info;

use crate::host::{DemoGraphics, DemoHost, DemoSprite, DemoTilemap, DemoViewport};

/// A viewport is disposed with members still attached; the members are then
/// dropped without their own `dispose`.
pub fn run(tracker: &Tracker, host: &DemoHost) -> Result<(), String> {
    let mut graphics = tracker.graphics(DemoGraphics::default());
    host.enter_scene("Scene_Battle");
    host.set_stack(["{3}:12:in `create_viewports'"]);

    let mut viewport = tracker.track_container(DemoViewport::new("battle"));
    let members = (
        tracker.track_in(DemoSprite::new("enemy"), &viewport),
        tracker.track_in(DemoTilemap::new("battleback"), &viewport),
    );
    graphics.update();

    viewport.dispose();
    if !viewport.is_disposed() {
        return Err("viewport should be disposed".to_owned());
    }
    drop(members);

    graphics.update();
    info!(frames = graphics.get().frames, "viewport scenario done");
    Ok(())
}
