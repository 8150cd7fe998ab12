pub mod easing;
pub mod event_bus;
pub mod frame;
pub mod timeline;

pub use easing::*;
pub use event_bus::*;
pub use frame::*;
pub use timeline::*;
