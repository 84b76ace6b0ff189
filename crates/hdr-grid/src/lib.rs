//! This crate provides [`LinearImage`], the half-float pixel buffer every hdr-oxide operation
//! works on, and the [`RasterSource`] / [`RasterSink`] adapters used at the edges of the system.
mod linear_image;
pub mod raster;
mod rect;

pub use linear_image::*;
pub use raster::{RasterSink, RasterSource};
pub use rect::Rect;

/// Linear-light, non-premultiplied RGBA value.
pub type Pixel = [f64; 4];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ArithmeticOverflow { width: u64, height: u64 },
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArithmeticOverflow { width, height } => write!(
                f,
                "buffer size of {width}x{height} image overflows native integer width"
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
