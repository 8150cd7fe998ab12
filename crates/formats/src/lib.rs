pub mod boundary;
pub mod extract;
pub mod flight;
pub mod query;

pub use boundary::*;
pub use extract::*;
pub use flight::*;
pub use query::*;
