//! Tracked wrappers for host display resources.
//!
//! A host display resource (a sprite, a plane, a window, a tilemap or a
//! viewport) must be disposed explicitly. Wrapping it in [`Tracked`] (or
//! [`Container`] for viewports) records it with the leak detector; dropping
//! the wrapper without calling `dispose` reports it at the next
//! [`Graphics::update`].
//!
//! Without the `diagnostics` feature every wrapper is a pass-through: nothing
//! is recorded and nothing is reported.

mod resource;
pub use resource::*;

#[cfg(not(feature = "diagnostics"))]
mod disabled;
#[cfg(feature = "diagnostics")]
mod enabled;

#[cfg(not(feature = "diagnostics"))]
pub use disabled::*;
#[cfg(feature = "diagnostics")]
pub use enabled::*;
