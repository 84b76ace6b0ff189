//! Integrations to other library crates.
//!
//! # Available integrations
//!
//! Integrations are enabled with feature flags.
//! - [`ImageSource`] and [`ImageSink`], which adapt `image::ImageBuffer` to the tone pipeline, and
//!   `Processor::decode_dynamic` (`image` feature)

#[cfg(feature = "image")]
mod image;

#[cfg(feature = "image")]
pub use image::*;
