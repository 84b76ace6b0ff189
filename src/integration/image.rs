use image::{traits::Enlargeable, DynamicImage, ImageBuffer, Luma, LumaA, Rgba};

use hdr_grid::{raster::Sample, LinearImage, Pixel, RasterSink, RasterSource, Rect};

use crate::{Processor, Result};

/// `image` pixel types that can be read as non-premultiplied 16-bit RGBA.
pub trait SourcePixel: image::Pixel + Sync {
    fn to_nrgba16(&self) -> [u16; 4];
}

/// `image` pixel types that can be written from values in `[0, 1]`.
pub trait SinkPixel: image::Pixel {
    fn from_unit(px: Pixel) -> Self;
}

impl<S: Sample + image::Primitive + Enlargeable> SourcePixel for Rgba<S> {
    #[inline]
    fn to_nrgba16(&self) -> [u16; 4] {
        self.0.map(Sample::to_u16)
    }
}

impl<S: Sample + image::Primitive + Enlargeable> SourcePixel for Luma<S> {
    #[inline]
    fn to_nrgba16(&self) -> [u16; 4] {
        let v = Sample::to_u16(self.0[0]);
        [v, v, v, 0xffff]
    }
}

impl<S: Sample + image::Primitive + Enlargeable> SourcePixel for LumaA<S> {
    #[inline]
    fn to_nrgba16(&self) -> [u16; 4] {
        let v = Sample::to_u16(self.0[0]);
        [v, v, v, Sample::to_u16(self.0[1])]
    }
}

impl<S: Sample + image::Primitive + Enlargeable> SinkPixel for Rgba<S> {
    #[inline]
    fn from_unit(px: Pixel) -> Self {
        Rgba(px.map(<S as Sample>::from_unit))
    }
}

fn buffer_bounds(width: u32, height: u32, (min_x, min_y): (i32, i32)) -> Rect {
    Rect::from_size(
        i32::try_from(width).unwrap_or(i32::MAX),
        i32::try_from(height).unwrap_or(i32::MAX),
    )
    .translate_to(min_x, min_y)
}

fn buffer_coords(x: i32, y: i32, (min_x, min_y): (i32, i32)) -> Option<(u32, u32)> {
    let x = u32::try_from(x as i64 - min_x as i64).ok()?;
    let y = u32::try_from(y as i64 - min_y as i64).ok()?;
    Some((x, y))
}

/// Reads an `image` buffer as a [`RasterSource`].
///
/// The top-left pixel of the buffer is placed at `origin`, `(0, 0)` by default.
#[derive(Debug, Copy, Clone)]
pub struct ImageSource<'a, P: image::Pixel> {
    buf: &'a ImageBuffer<P, Vec<P::Subpixel>>,
    origin: (i32, i32),
}

impl<'a, P: image::Pixel> ImageSource<'a, P> {
    pub fn new(buf: &'a ImageBuffer<P, Vec<P::Subpixel>>) -> Self {
        Self::with_origin(buf, 0, 0)
    }

    pub fn with_origin(buf: &'a ImageBuffer<P, Vec<P::Subpixel>>, min_x: i32, min_y: i32) -> Self {
        Self {
            buf,
            origin: (min_x, min_y),
        }
    }
}

impl<P> RasterSource for ImageSource<'_, P>
where
    P: SourcePixel,
    P::Subpixel: Sync,
{
    #[inline]
    fn bounds(&self) -> Rect {
        buffer_bounds(self.buf.width(), self.buf.height(), self.origin)
    }

    #[inline]
    fn sample_nrgba16(&self, x: i32, y: i32) -> [u16; 4] {
        buffer_coords(x, y, self.origin)
            .and_then(|(x, y)| self.buf.get_pixel_checked(x, y))
            .map(SourcePixel::to_nrgba16)
            .unwrap_or([0; 4])
    }
}

/// Writes into an `image` buffer as a [`RasterSink`].
///
/// The top-left pixel of the buffer is placed at `origin`, `(0, 0)` by default.
#[derive(Debug)]
pub struct ImageSink<'a, P: image::Pixel> {
    buf: &'a mut ImageBuffer<P, Vec<P::Subpixel>>,
    origin: (i32, i32),
}

impl<'a, P: image::Pixel> ImageSink<'a, P> {
    pub fn new(buf: &'a mut ImageBuffer<P, Vec<P::Subpixel>>) -> Self {
        Self::with_origin(buf, 0, 0)
    }

    pub fn with_origin(
        buf: &'a mut ImageBuffer<P, Vec<P::Subpixel>>,
        min_x: i32,
        min_y: i32,
    ) -> Self {
        Self {
            buf,
            origin: (min_x, min_y),
        }
    }
}

impl<P: SinkPixel> RasterSink for ImageSink<'_, P> {
    #[inline]
    fn bounds(&self) -> Rect {
        buffer_bounds(self.buf.width(), self.buf.height(), self.origin)
    }

    #[inline]
    fn put_unit(&mut self, x: i32, y: i32, px: Pixel) {
        let Some((x, y)) = buffer_coords(x, y, self.origin) else {
            return;
        };
        if let Some(out) = self.buf.get_pixel_mut_checked(x, y) {
            *out = P::from_unit(px);
        }
    }
}

impl Processor {
    /// Decodes a `DynamicImage` to linear light.
    ///
    /// Pixel types without a direct adapter are converted to 16-bit RGBA first.
    pub fn decode_dynamic(&self, image: &DynamicImage) -> Result<LinearImage> {
        match image {
            DynamicImage::ImageRgba8(buf) => self.decode(&ImageSource::new(buf)),
            DynamicImage::ImageRgba16(buf) => self.decode(&ImageSource::new(buf)),
            DynamicImage::ImageLuma8(buf) => self.decode(&ImageSource::new(buf)),
            DynamicImage::ImageLuma16(buf) => self.decode(&ImageSource::new(buf)),
            DynamicImage::ImageLumaA8(buf) => self.decode(&ImageSource::new(buf)),
            DynamicImage::ImageLumaA16(buf) => self.decode(&ImageSource::new(buf)),
            _ => self.decode(&ImageSource::new(&image.to_rgba16())),
        }
    }

    /// Encodes a linear image into a new `image` buffer.
    ///
    /// The top-left pixel of `linear` becomes pixel `(0, 0)` of the buffer.
    pub fn encode_image<S>(&self, linear: &LinearImage) -> ImageBuffer<Rgba<S>, Vec<S>>
    where
        S: Sample + image::Primitive + Enlargeable,
    {
        let rect = linear.bounds();
        let mut out = ImageBuffer::new(rect.width() as u32, rect.height() as u32);
        self.encode_into(
            linear,
            &mut ImageSink::with_origin(&mut out, rect.min_x, rect.min_y),
        );
        out
    }
}
