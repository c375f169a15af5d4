//! Client for the generation service.
//!
//! [`GeminiImageService`] resolves its configuration per call, keeps one
//! memoized connection in a [`ClientCache`], validates every request before
//! it is sent and maps HTTP failures into [`crate::error::ImageError`].

mod builder;
mod cache;
mod client;
mod traits;
mod validation;

pub use builder::ImageServiceBuilder;
pub use cache::{ClientCache, ClientHandle};
pub use client::GeminiImageService;
pub use traits::ImageService;
pub use validation::{validate_generate_request, validate_predict_request};
