//! Error types for the image client.

mod types;
mod categories;
mod mapper;
mod classifier;

pub use types::*;
pub use categories::*;
pub use mapper::*;
pub use classifier::*;
