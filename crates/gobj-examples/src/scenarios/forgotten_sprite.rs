use gobj::Tracker;
use tracing::info;

use crate::host::{DemoGraphics, DemoHost, DemoSprite};

/// A sprite created in a map scene goes out of scope without `dispose`.
pub fn run(tracker: &Tracker, host: &DemoHost) -> Result<(), String> {
    let mut graphics = tracker.graphics(DemoGraphics::default());
    host.enter_scene("Scene_Map");
    host.set_stack(["{2}:118:in `create_pictures'", "{1}:40:in `start'"]);

    {
        let sprite = tracker.track(DemoSprite::new("picture"));
        info!(id = ?sprite.id(), "created picture sprite");
        graphics.update();
    }

    graphics.update();
    info!(frames = graphics.get().frames, "forgotten sprite scenario done");
    Ok(())
}
