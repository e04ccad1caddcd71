//! In-memory stand-in for a display host: resources that only flip flags, a
//! scene and script stack the scenarios set by hand, and a frame counter.

use gobj::{Attachable, FrameUpdate, HostContext, HostError, HostResource, ResourceKind};
use parking_lot::Mutex;

/// Scene and script state a real host would query from its interpreter.
#[derive(Default)]
pub struct DemoHost {
    scene: Mutex<Option<String>>,
    stack: Mutex<Vec<String>>,
    scripts: Vec<String>,
}

impl DemoHost {
    pub fn new<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scripts: scripts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn enter_scene(&self, scene: impl Into<String>) {
        *self.scene.lock() = Some(scene.into());
    }

    pub fn leave_scene(&self) {
        *self.scene.lock() = None;
    }

    /// Sets the script stack reported for resources constructed next, in
    /// `{index}:{line}:in 'method'` form.
    pub fn set_stack<I, S>(&self, frames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.stack.lock() = frames.into_iter().map(Into::into).collect();
    }
}

impl HostContext for DemoHost {
    fn current_scene(&self) -> Result<Option<String>, HostError> {
        Ok(self.scene.lock().clone())
    }

    fn script_stack(&self) -> Vec<String> {
        self.stack.lock().clone()
    }

    fn loaded_scripts(&self) -> Vec<String> {
        self.scripts.clone()
    }
}

/// Host-side state shared by every demo resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub name: String,
    pub released: bool,
    pub visible: bool,
    pub opacity: u8,
}

impl Surface {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            released: false,
            visible: true,
            opacity: 255,
        }
    }
}

macro_rules! demo_resource {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub surface: Surface,
            pub viewport: Option<String>,
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    surface: Surface::new(name),
                    viewport: None,
                }
            }
        }

        impl HostResource for $name {
            const KIND: ResourceKind = ResourceKind::$kind;

            fn release(&mut self) {
                self.surface.released = true;
            }

            fn is_released(&self) -> bool {
                self.surface.released
            }

            fn is_visible(&self) -> bool {
                self.surface.visible
            }

            fn set_visible(&mut self, visible: bool) {
                self.surface.visible = visible;
            }

            fn opacity(&self) -> Option<u8> {
                Some(self.surface.opacity)
            }

            fn set_opacity(&mut self, opacity: u8) {
                self.surface.opacity = opacity;
            }
        }

        impl Attachable<DemoViewport> for $name {
            fn set_container(&mut self, container: Option<&DemoViewport>) {
                self.viewport = container.map(|viewport| viewport.surface.name.clone());
            }
        }
    };
}

demo_resource!(DemoSprite, Sprite);
demo_resource!(DemoPlane, Plane);
demo_resource!(
    /// Windows are drawn in their own layer in most hosts; here they may
    /// still be attached to a viewport.
    DemoWindow,
    Window
);
demo_resource!(DemoTilemap, Tilemap);

/// A viewport: no opacity of its own, other resources attach to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoViewport {
    pub surface: Surface,
}

impl DemoViewport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            surface: Surface::new(name),
        }
    }
}

impl HostResource for DemoViewport {
    const KIND: ResourceKind = ResourceKind::Viewport;

    fn release(&mut self) {
        self.surface.released = true;
    }

    fn is_released(&self) -> bool {
        self.surface.released
    }

    fn is_visible(&self) -> bool {
        self.surface.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.surface.visible = visible;
    }
}

/// Counts frames.
#[derive(Debug, Default)]
pub struct DemoGraphics {
    pub frames: u64,
}

impl FrameUpdate for DemoGraphics {
    fn update(&mut self) {
        self.frames += 1;
    }
}
