//! hdr-oxide is a linear-light image processing library written in pure Rust. It's internally
//! organized into a few small crates. This crate acts as a blanket and provides a simple
//! interface made from those crates.
//!
//! # Decoding to linear light
//!
//! Every operation works on [`LinearImage`], an RGBA buffer of half-float samples in linear
//! light. Encoded images are read through [`RasterSource`] and converted by a [`Processor`],
//! which applies the per-channel tone curves of a [`TonePipeline`]:
//!
//! ```
//! use hdr_oxide::{raster::{InterleavedImage, PixelLayout}, Processor, Rect};
//!
//! # fn main() -> hdr_oxide::Result<()> {
//! let source = InterleavedImage::from_raw(
//!     Rect::from_size(2, 1),
//!     PixelLayout::Nrgba,
//!     vec![0u8, 0, 0, 255, 255, 255, 255, 255],
//! )
//! .expect("buffer size mismatch");
//!
//! let processor = Processor::default(); // sRGB curves, Lanczos3
//! let linear = processor.decode(&source)?;
//! assert_eq!(linear.at(1, 0), [1.0, 1.0, 1.0, 1.0]);
//! # Ok(())
//! # }
//! ```
//!
//! Tone curves can also be taken from an ICC profile. [`IccProfile::parse`] reads the `rTRC`,
//! `gTRC` and `bTRC` tags, which are used by [`ProcessorBuilder::profile`]:
//!
//! ```no_run
//! use hdr_oxide::{IccProfile, Processor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let icc = std::fs::read("display.icc")?;
//! let profile = IccProfile::parse(&icc)?;
//! let processor = Processor::builder().profile(&profile)?.build();
//! # let _ = processor;
//! # Ok(())
//! # }
//! ```
//!
//! # Resampling
//!
//! [`Processor::resample`] maps a linear image onto new bounds with one of the kernels in
//! [`ResampleKernel`]. [`Processor::resize`] runs decode, resample and encode in one go:
//!
//! ```
//! use hdr_oxide::{
//!     raster::{InterleavedImage, PixelLayout},
//!     Processor, Rect, ResampleKernel,
//! };
//!
//! # fn main() -> hdr_oxide::Result<()> {
//! let source = InterleavedImage::<u8>::new(Rect::from_size(64, 48), PixelLayout::Nrgba)?;
//! let processor = Processor::builder().kernel(ResampleKernel::CatmullRom).build();
//! let thumbnail = processor.resize::<u8>(&source, Rect::from_size(16, 12))?;
//! assert_eq!(thumbnail.buf().len(), 16 * 12 * 4);
//! # Ok(())
//! # }
//! ```
//!
//! # Multithreading
//!
//! With the `rayon` feature enabled (the default), [`ProcessorBuilder::build`] creates a new Rayon
//! thread pool with one worker per available CPU unless a pool is given with
//! [`ProcessorBuilder::pool`]. Cloning a [`Processor`] or a [`ThreadPool`] shares the workers, so
//! build once and clone instead of calling [`Processor::default`] repeatedly. Results are
//! identical regardless of the pool.
//!
//! # Feature flags
//!
//! - `rayon` (default): enables multithreading with Rayon.
//! - `image`: enables adapters for the `image` crate. See [`integration`].
mod error;
pub mod integration;
mod processor;

pub use error::{Error, Result};
pub use processor::{Processor, ProcessorBuilder};

pub use hdr_color::Error as ColorError;
pub use hdr_grid::Error as GridError;

pub use hdr_color::{
    curve, decode_tone, encode_tone, icc, tf, IccProfile, ParametricCurve, ParametricFunction,
    SampledCurve, TagData, TagSignature, ToneCurve, TonePipeline,
};
pub use hdr_grid::{raster, LinearImage, Pixel, RasterSink, RasterSource, Rect, RowBand};
pub use hdr_resample::{resample, resample_into, ResampleKernel, Resampler};
pub use hdr_threadpool::ThreadPool;
