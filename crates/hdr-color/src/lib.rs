//! Tone reproduction curves, ICC profile decoding/encoding, and the tone pipeline converting
//! between encoded images and [`LinearImage`](hdr_grid::LinearImage).
pub mod curve;
mod error;
pub mod icc;
mod pipeline;
pub mod tf;

pub use curve::{ParametricCurve, ParametricFunction, SampledCurve, ToneCurve};
pub use error::*;
pub use icc::{IccProfile, IccTag, TagData, TagSignature};
pub use pipeline::*;
