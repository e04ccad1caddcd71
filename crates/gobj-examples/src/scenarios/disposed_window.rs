use gobj::Tracker;

use crate::host::{DemoGraphics, DemoHost, DemoWindow};

/// The well-behaved case: a window disposed before it is dropped.
pub fn run(tracker: &Tracker, host: &DemoHost) -> Result<(), String> {
    let mut graphics = tracker.graphics(DemoGraphics::default());
    host.enter_scene("Scene_Menu");

    let mut window = tracker.track(DemoWindow::new("status"));
    graphics.update();
    window.dispose();
    drop(window);
    graphics.update();
    Ok(())
}
