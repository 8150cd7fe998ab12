pub mod globe;
pub mod radar;
