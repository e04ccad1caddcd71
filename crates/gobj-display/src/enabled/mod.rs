mod graphics;
mod tracked;
mod tracker;

pub use self::graphics::*;
pub use self::tracked::*;
pub use self::tracker::*;
