//! Adapters between host image representations and the tone pipeline.
//!
//! Every source is read as non-premultiplied 16-bit RGBA, and every sink receives
//! non-premultiplied channel values in `[0, 1]`, leaving the narrowing to the sink's own sample
//! type.
use crate::{Pixel, Rect};

/// Image that can be read as non-premultiplied 16-bit RGBA.
pub trait RasterSource: Sync {
    fn bounds(&self) -> Rect;

    /// Samples the pixel at `(x, y)`. Only called with coordinates inside of [`bounds`].
    ///
    /// [`bounds`]: RasterSource::bounds
    fn sample_nrgba16(&self, x: i32, y: i32) -> [u16; 4];
}

/// Image that can be written from non-premultiplied RGBA values in `[0, 1]`.
pub trait RasterSink {
    fn bounds(&self) -> Rect;

    /// Stores the pixel at `(x, y)`. Values are already clamped to `[0, 1]`.
    fn put_unit(&mut self, x: i32, y: i32, px: Pixel);
}

/// Integer sample type of an encoded image.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    const MAX: u16;

    /// Widens to the 16-bit range, mapping `MAX` to `0xffff`.
    fn to_u16(self) -> u16;

    /// Narrows a value in `[0, 1]` by multiplying with `MAX` and truncating.
    fn from_unit(v: f64) -> Self;
}

impl Sample for u8 {
    const MAX: u16 = 0xff;

    #[inline]
    fn to_u16(self) -> u16 {
        self as u16 * 257
    }

    #[inline]
    fn from_unit(v: f64) -> Self {
        (v.clamp(0.0, 1.0) * 255.0) as u8
    }
}

impl Sample for u16 {
    const MAX: u16 = 0xffff;

    #[inline]
    fn to_u16(self) -> u16 {
        self
    }

    #[inline]
    fn from_unit(v: f64) -> Self {
        (v.clamp(0.0, 1.0) * 65535.0) as u16
    }
}

/// Channel layout of an [`InterleavedImage`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// RGBA, colour channels not multiplied by alpha.
    Nrgba,
    /// RGBA, colour channels premultiplied by alpha.
    Rgba,
    Gray,
    GrayAlpha,
}

impl PixelLayout {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            Self::Nrgba | Self::Rgba => 4,
            Self::Gray => 1,
            Self::GrayAlpha => 2,
        }
    }
}

/// Interleaved 8- or 16-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedImage<S> {
    rect: Rect,
    layout: PixelLayout,
    buf: Vec<S>,
}

impl<S: Sample> InterleavedImage<S> {
    /// Creates a zeroed image.
    pub fn new(rect: Rect, layout: PixelLayout) -> crate::Result<Self> {
        let len = rect
            .width()
            .checked_mul(rect.height())
            .and_then(|len| len.checked_mul(layout.channels() as u64))
            .and_then(|len| usize::try_from(len).ok())
            .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<S>())
            .ok_or(crate::Error::ArithmeticOverflow {
                width: rect.width(),
                height: rect.height(),
            })?;
        Ok(Self {
            rect,
            layout,
            buf: vec![S::default(); len],
        })
    }

    /// Wraps an existing buffer in raster order.
    ///
    /// Returns `None` if the buffer length doesn't match the bounds and the layout.
    pub fn from_raw(rect: Rect, layout: PixelLayout, buf: Vec<S>) -> Option<Self> {
        let expected = rect
            .width()
            .checked_mul(rect.height())
            .and_then(|len| len.checked_mul(layout.channels() as u64));
        (expected == Some(buf.len() as u64)).then_some(Self { rect, layout, buf })
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    #[inline]
    pub fn buf(&self) -> &[S] {
        &self.buf
    }

    #[inline]
    pub fn buf_mut(&mut self) -> &mut [S] {
        &mut self.buf
    }

    #[inline]
    pub fn into_raw(self) -> Vec<S> {
        self.buf
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        let dy = (y as i64 - self.rect.min_y as i64) as usize;
        let dx = (x as i64 - self.rect.min_x as i64) as usize;
        (dy * self.rect.width() as usize + dx) * self.layout.channels()
    }

    /// Returns the stored samples of the pixel at `(x, y)`.
    pub fn get(&self, x: i32, y: i32) -> Option<&[S]> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let offset = self.offset(x, y);
        Some(&self.buf[offset..offset + self.layout.channels()])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut [S]> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let offset = self.offset(x, y);
        let channels = self.layout.channels();
        Some(&mut self.buf[offset..offset + channels])
    }
}

impl<S: Sample> RasterSource for InterleavedImage<S> {
    #[inline]
    fn bounds(&self) -> Rect {
        InterleavedImage::bounds(self)
    }

    fn sample_nrgba16(&self, x: i32, y: i32) -> [u16; 4] {
        let Some(px) = self.get(x, y) else {
            return [0; 4];
        };

        match self.layout {
            PixelLayout::Nrgba => [px[0], px[1], px[2], px[3]].map(S::to_u16),
            PixelLayout::Rgba => unpremultiply([px[0], px[1], px[2], px[3]].map(S::to_u16)),
            PixelLayout::Gray => {
                let v = px[0].to_u16();
                [v, v, v, 0xffff]
            }
            PixelLayout::GrayAlpha => {
                let v = px[0].to_u16();
                [v, v, v, px[1].to_u16()]
            }
        }
    }
}

impl<S: Sample> RasterSink for InterleavedImage<S> {
    #[inline]
    fn bounds(&self) -> Rect {
        InterleavedImage::bounds(self)
    }

    fn put_unit(&mut self, x: i32, y: i32, px: Pixel) {
        let layout = self.layout;
        let Some(out) = self.get_mut(x, y) else {
            return;
        };

        let [r, g, b, a] = px;
        match layout {
            PixelLayout::Nrgba => {
                for (out, v) in out.iter_mut().zip(px) {
                    *out = S::from_unit(v);
                }
            }
            PixelLayout::Rgba => {
                for (out, v) in out.iter_mut().zip([r * a, g * a, b * a, a]) {
                    *out = S::from_unit(v);
                }
            }
            PixelLayout::Gray => out[0] = S::from_unit(luma(r, g, b)),
            PixelLayout::GrayAlpha => {
                out[0] = S::from_unit(luma(r, g, b));
                out[1] = S::from_unit(a);
            }
        }
    }
}

/// BT.709 weights, applied to the encoded values.
#[inline]
fn luma(r: f64, g: f64, b: f64) -> f64 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

#[inline]
fn unpremultiply([r, g, b, a]: [u16; 4]) -> [u16; 4] {
    if a == 0 {
        return [0; 4];
    }
    if a == 0xffff {
        return [r, g, b, a];
    }

    let a32 = a as u32;
    let [r, g, b] = [r, g, b].map(|c| ((c as u32 * 0xffff + a32 / 2) / a32).min(0xffff) as u16);
    [r, g, b, a]
}

/// 8-bit indexed image with a non-premultiplied 16-bit palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalettedImage {
    rect: Rect,
    palette: Vec<[u16; 4]>,
    indices: Vec<u8>,
}

impl PalettedImage {
    /// Returns `None` if `indices` doesn't cover the bounds exactly.
    pub fn new(rect: Rect, palette: Vec<[u16; 4]>, indices: Vec<u8>) -> Option<Self> {
        (rect.width().checked_mul(rect.height()) == Some(indices.len() as u64)).then_some(Self {
            rect,
            palette,
            indices,
        })
    }

    #[inline]
    pub fn palette(&self) -> &[[u16; 4]] {
        &self.palette
    }

    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }
}

impl RasterSource for PalettedImage {
    #[inline]
    fn bounds(&self) -> Rect {
        self.rect
    }

    /// Indices past the end of the palette read as transparent black.
    fn sample_nrgba16(&self, x: i32, y: i32) -> [u16; 4] {
        if !self.rect.contains(x, y) {
            return [0; 4];
        }
        let dy = (y as i64 - self.rect.min_y as i64) as usize;
        let dx = (x as i64 - self.rect.min_x as i64) as usize;
        let idx = self.indices[dy * self.rect.width() as usize + dx];
        self.palette.get(idx as usize).copied().unwrap_or([0; 4])
    }
}
