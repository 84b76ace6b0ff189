use std::ops::Range;

use half::f16;

use crate::{Error, Pixel, Rect, Result};

const BYTES_PER_PIXEL: usize = 8;

/// Linear-light RGBA image with half-float samples and non-premultiplied alpha.
///
/// Pixels are stored in raster order, 8 bytes each: big-endian binary16 R, G, B and A. Pixel
/// `(x, y)` lives at byte offset `(y - min_y) * stride + (x - min_x) * 8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearImage {
    rect: Rect,
    stride: usize,
    pix: Vec<u8>,
}

fn buffer_layout(rect: Rect) -> Result<(usize, usize)> {
    let overflow = || Error::ArithmeticOverflow {
        width: rect.width(),
        height: rect.height(),
    };

    let width = usize::try_from(rect.width()).map_err(|_| overflow())?;
    let height = usize::try_from(rect.height()).map_err(|_| overflow())?;
    let stride = width.checked_mul(BYTES_PER_PIXEL).ok_or_else(overflow)?;
    let len = stride.checked_mul(height).ok_or_else(overflow)?;
    if len > isize::MAX as usize {
        return Err(overflow());
    }
    Ok((stride, len))
}

#[inline]
fn decode_pixel(bytes: &[u8; BYTES_PER_PIXEL]) -> [f16; 4] {
    std::array::from_fn(|c| f16::from_be_bytes([bytes[2 * c], bytes[2 * c + 1]]))
}

#[inline]
fn encode_pixel(out: &mut [u8], px: [f16; 4]) {
    for (dst, v) in out.chunks_exact_mut(2).zip(px) {
        dst.copy_from_slice(&v.to_be_bytes());
    }
}

#[inline]
fn narrow(px: Pixel) -> [f16; 4] {
    px.map(f16::from_f64)
}

impl LinearImage {
    /// Allocates a zeroed (transparent black) image covering `rect`.
    ///
    /// # Errors
    /// Returns [`Error::ArithmeticOverflow`] if `width * height * 8` does not fit in `usize`.
    pub fn new(rect: Rect) -> Result<Self> {
        let (stride, len) = buffer_layout(rect)?;
        tracing::trace!(?rect, len, "Allocating linear image");
        Ok(Self {
            rect,
            stride,
            pix: vec![0u8; len],
        })
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.stride / BYTES_PER_PIXEL
    }

    #[inline]
    pub fn height(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.pix.len() / self.stride
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pix.is_empty()
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pix
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pix
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        let dy = (y as i64 - self.rect.min_y as i64) as usize;
        let dx = (x as i64 - self.rect.min_x as i64) as usize;
        dy * self.width() + dx
    }

    #[inline]
    fn pixel_bytes(&self, idx: usize) -> &[u8; BYTES_PER_PIXEL] {
        &bytemuck::cast_slice::<u8, [u8; BYTES_PER_PIXEL]>(&self.pix)[idx]
    }

    /// Reads the raw half-float samples at `(x, y)`.
    ///
    /// Coordinates outside of the bounds read the nearest edge pixel. An empty image reads as
    /// transparent black.
    #[inline]
    pub fn at_f16(&self, x: i32, y: i32) -> [f16; 4] {
        if self.pix.is_empty() {
            return [f16::ZERO; 4];
        }
        let (x, y) = self.rect.clamp(x, y);
        decode_pixel(self.pixel_bytes(self.index(x, y)))
    }

    /// Reads the pixel at `(x, y)` with clamp-to-edge semantics, widened to `f64`.
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> Pixel {
        self.at_f16(x, y).map(f16::to_f64)
    }

    /// Writes raw half-float samples. Bit patterns, including NaN and infinities, are stored
    /// verbatim. Writes outside of the bounds are ignored.
    #[inline]
    pub fn set_f16(&mut self, x: i32, y: i32, px: [f16; 4]) {
        if !self.rect.contains(x, y) {
            return;
        }
        let offset = self.index(x, y) * BYTES_PER_PIXEL;
        encode_pixel(&mut self.pix[offset..offset + BYTES_PER_PIXEL], px);
    }

    /// Writes a pixel, rounding each channel to the nearest half-float. Writes outside of the
    /// bounds are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, px: Pixel) {
        self.set_f16(x, y, narrow(px));
    }

    /// Fills every pixel with `px`.
    pub fn fill(&mut self, px: Pixel) {
        let mut bytes = [0u8; BYTES_PER_PIXEL];
        encode_pixel(&mut bytes, narrow(px));
        for out in bytemuck::cast_slice_mut::<u8, [u8; BYTES_PER_PIXEL]>(&mut self.pix) {
            *out = bytes;
        }
    }

    /// Splits the buffer into disjoint mutable bands of rows.
    ///
    /// `rows` are row offsets relative to `min_y`, and must be sorted and non-overlapping.
    ///
    /// # Panics
    /// Panics if a range is reversed, overlaps a previous one, or extends past the last row.
    pub fn row_bands_mut(&mut self, rows: &[Range<usize>]) -> Vec<RowBand<'_>> {
        let height = self.height();
        let stride = self.stride;
        let rect = self.rect;

        let mut rest: &mut [u8] = &mut self.pix;
        let mut consumed = 0usize;
        let mut bands = Vec::with_capacity(rows.len());
        for range in rows {
            assert!(
                consumed <= range.start && range.start <= range.end && range.end <= height,
                "invalid row range {range:?} (height {height}, next free row {consumed})",
            );

            let (_, tail) = std::mem::take(&mut rest).split_at_mut((range.start - consumed) * stride);
            let (band, tail) = tail.split_at_mut((range.end - range.start) * stride);
            rest = tail;
            consumed = range.end;

            let min_y = (rect.min_y as i64 + range.start as i64) as i32;
            let max_y = (rect.min_y as i64 + range.end as i64) as i32;
            bands.push(RowBand {
                rect: Rect::new(rect.min_x, min_y, rect.max_x, max_y),
                stride,
                buf: band,
            });
        }
        bands
    }
}

/// Mutable view of consecutive rows of a [`LinearImage`].
///
/// Bands handed out by [`LinearImage::row_bands_mut`] never overlap, so they can be written from
/// different threads.
#[derive(Debug)]
pub struct RowBand<'g> {
    rect: Rect,
    stride: usize,
    buf: &'g mut [u8],
}

impl RowBand<'_> {
    /// Region covered by this band, in image coordinates.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    /// Writes raw half-float samples. Writes outside of the band are ignored.
    #[inline]
    pub fn set_f16(&mut self, x: i32, y: i32, px: [f16; 4]) {
        if !self.rect.contains(x, y) {
            return;
        }
        let dy = (y as i64 - self.rect.min_y as i64) as usize;
        let dx = (x as i64 - self.rect.min_x as i64) as usize;
        let offset = dy * self.stride + dx * BYTES_PER_PIXEL;
        encode_pixel(&mut self.buf[offset..offset + BYTES_PER_PIXEL], px);
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, px: Pixel) {
        self.set_f16(x, y, narrow(px));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let image = LinearImage::new(Rect::new(-3, 2, 5, 6)).unwrap();
        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 4);
        assert_eq!(image.stride(), 64);
        assert_eq!(image.pixels().len(), 256);
        assert!(image.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn big_endian_storage() {
        let mut image = LinearImage::new(Rect::new(10, 20, 12, 22)).unwrap();
        image.set(11, 21, [1.0, -2.0, 0.5, 1.0]);
        let offset = image.stride() + 8;
        assert_eq!(
            &image.pixels()[offset..offset + 8],
            &[0x3c, 0x00, 0xc0, 0x00, 0x38, 0x00, 0x3c, 0x00],
        );
        assert_eq!(image.at(11, 21), [1.0, -2.0, 0.5, 1.0]);
    }

    #[test]
    fn clamp_to_edge() {
        let mut image = LinearImage::new(Rect::from_size(3, 2)).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                image.set(x, y, [x as f64, y as f64, 0.0, 1.0]);
            }
        }

        assert_eq!(image.at(-5, -5), image.at(0, 0));
        assert_eq!(image.at(7, 0), image.at(2, 0));
        assert_eq!(image.at(1, 9), image.at(1, 1));
        assert_eq!(image.at(100, -100), [2.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn out_of_bounds_write_is_ignored() {
        let mut image = LinearImage::new(Rect::from_size(2, 2)).unwrap();
        let before = image.clone();
        image.set(2, 0, [1.0; 4]);
        image.set(-1, 1, [1.0; 4]);
        assert_eq!(image, before);
    }

    #[test]
    fn hdr_and_special_values() {
        let mut image = LinearImage::new(Rect::from_size(1, 1)).unwrap();
        image.set(0, 0, [16.0, -0.25, 1000.0, 0.5]);
        assert_eq!(image.at(0, 0), [16.0, -0.25, 1000.0, 0.5]);

        let nan = f16::from_bits(0x7e01);
        image.set_f16(0, 0, [nan, f16::INFINITY, f16::NEG_INFINITY, f16::ONE]);
        let read = image.at_f16(0, 0);
        assert_eq!(read[0].to_bits(), 0x7e01);
        assert_eq!(read[1], f16::INFINITY);
        assert_eq!(read[2], f16::NEG_INFINITY);
    }

    #[test]
    fn empty_image() {
        let image = LinearImage::new(Rect::new(5, 5, 5, 9)).unwrap();
        assert!(image.is_empty());
        assert_eq!(image.at(5, 5), [0.0; 4]);
    }

    #[test]
    fn overflow() {
        let rect = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        if usize::BITS <= 64 {
            assert!(matches!(
                LinearImage::new(rect),
                Err(Error::ArithmeticOverflow { .. })
            ));
        }
    }

    #[test]
    fn row_bands() {
        let mut image = LinearImage::new(Rect::new(0, 10, 4, 16)).unwrap();
        {
            let mut bands = image.row_bands_mut(&[0..2, 2..5, 5..6]);
            assert_eq!(bands.len(), 3);
            assert_eq!(bands[1].bounds(), Rect::new(0, 12, 4, 15));
            for (idx, band) in bands.iter_mut().enumerate() {
                let rect = band.bounds();
                for y in rect.min_y..rect.max_y {
                    for x in rect.min_x..rect.max_x {
                        band.set(x, y, [idx as f64, 0.0, 0.0, 1.0]);
                    }
                }
                // Outside of the band
                band.set(0, rect.max_y, [9.0; 4]);
            }
        }

        assert_eq!(image.at(3, 11)[0], 0.0);
        assert_eq!(image.at(0, 12)[0], 1.0);
        assert_eq!(image.at(2, 14)[0], 1.0);
        assert_eq!(image.at(1, 15)[0], 2.0);
    }

    #[test]
    #[should_panic]
    fn overlapping_row_bands() {
        let mut image = LinearImage::new(Rect::from_size(2, 4)).unwrap();
        image.row_bands_mut(&[0..3, 2..4]);
    }
}
