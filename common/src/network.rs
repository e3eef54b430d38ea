pub mod range;
pub mod source;
pub mod target;
