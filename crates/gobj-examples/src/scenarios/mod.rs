//! Each scenario drives the demo host through a few frames against the given
//! tracker. What ends up reported depends on the tracker's configuration.

pub mod disposed_window;
pub mod forgotten_sprite;
pub mod hidden_sprite;
pub mod shared_plane;
pub mod viewport_auto_release;
