pub mod components;
pub mod globe;
pub mod graph;
pub mod path;
pub mod prefabs;
pub mod radar;
pub mod view_state;

pub use graph::*;
pub use path::*;
