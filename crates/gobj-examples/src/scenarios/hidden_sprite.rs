use gobj::Tracker;
use tracing::info;

use crate::host::{DemoGraphics, DemoHost, DemoPlane, DemoSprite, DemoViewport, DemoWindow};

/// Three leaks nobody could see: a hidden sprite, a fully transparent window
/// and a plane inside a hidden viewport. Reported only with filtering off.
pub fn run(tracker: &Tracker, host: &DemoHost) -> Result<(), String> {
    let mut graphics = tracker.graphics(DemoGraphics::default());
    host.enter_scene("Scene_Menu");

    let mut viewport = tracker.track_container(DemoViewport::new("overlay"));
    {
        let mut sprite = tracker.track(DemoSprite::new("cursor"));
        sprite.set_visible(false);

        let mut window = tracker.track(DemoWindow::new("help"));
        window.set_opacity(0);

        let _plane = tracker.track_in(DemoPlane::new("fog"), &viewport);
        viewport.set_visible(false);
    }

    graphics.update();
    viewport.dispose();
    graphics.update();
    info!(frames = graphics.get().frames, "hidden leaks scenario done");
    Ok(())
}
