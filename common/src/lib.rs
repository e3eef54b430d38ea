pub mod config;
pub mod error;
pub mod lists;
pub mod models;
pub mod network;

mod macros;

#[doc(hidden)]
pub use tracing as __tracing;
