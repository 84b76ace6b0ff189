use hdr_grid::{
    raster::{InterleavedImage, PixelLayout, Sample},
    LinearImage, Pixel, RasterSink, RasterSource, Rect,
};
use hdr_threadpool::ThreadPool;

use crate::{curve::clamp_unit, tf::srgb, IccProfile, Result, ToneCurve};

/// Converts between encoded images and [`LinearImage`] using per-channel tone curves.
///
/// Alpha is never transformed. Curves recognized as the sRGB curve are evaluated with the exact
/// sRGB parameters, and 8-bit samples are decoded through the precomputed sRGB table.
#[derive(Debug, Clone)]
pub struct TonePipeline {
    curves: [ToneCurve; 3],
    srgb: [bool; 3],
}

impl TonePipeline {
    pub fn from_curves(curves: [ToneCurve; 3]) -> Self {
        let srgb = std::array::from_fn(|idx| curves[idx].is_srgb());
        Self { curves, srgb }
    }

    pub fn srgb() -> Self {
        Self::from_curves(std::array::from_fn(|_| ToneCurve::srgb()))
    }

    /// Uses the `rTRC`, `gTRC` and `bTRC` curves of the profile.
    pub fn from_profile(profile: &IccProfile) -> Result<Self> {
        let curves = profile.rgb_curves()?;
        Ok(Self::from_curves(curves.map(Clone::clone)))
    }

    #[inline]
    pub fn curves(&self) -> &[ToneCurve; 3] {
        &self.curves
    }

    fn decode_channel(&self, channel: usize, v: u16) -> f64 {
        if !self.srgb[channel] {
            return self.curves[channel].decode(v as f64 / 65535.0);
        }

        if v % 257 == 0 {
            srgb::decode_u8((v / 257) as u8) as f64 / 65535.0
        } else {
            srgb::decode(v as f64 / 65535.0)
        }
    }

    fn encode_channel(&self, channel: usize, v: f64) -> f64 {
        let v = clamp_unit(v);
        if self.srgb[channel] {
            srgb::encode(v)
        } else {
            clamp_unit(self.curves[channel].encode(v))
        }
    }

    /// Converts a non-premultiplied 16-bit pixel to linear light.
    pub fn decode_pixel(&self, [r, g, b, a]: [u16; 4]) -> Pixel {
        [
            self.decode_channel(0, r),
            self.decode_channel(1, g),
            self.decode_channel(2, b),
            a as f64 / 65535.0,
        ]
    }

    /// Converts a linear pixel to encoded values in `[0, 1]`.
    pub fn encode_pixel(&self, [r, g, b, a]: Pixel) -> Pixel {
        [
            self.encode_channel(0, r),
            self.encode_channel(1, g),
            self.encode_channel(2, b),
            clamp_unit(a),
        ]
    }

    /// Decodes `source` into a new linear image with the same bounds.
    pub fn decode_tone(
        &self,
        source: &(impl RasterSource + ?Sized),
        pool: &ThreadPool,
    ) -> Result<LinearImage> {
        let rect = source.bounds();
        let mut out = LinearImage::new(rect)?;
        let _guard = tracing::trace_span!(
            "Decode tone",
            width = rect.width(),
            height = rect.height(),
        )
        .entered();

        let rows = pool.split_range(0, out.height());
        let mut bands = out.row_bands_mut(&rows);
        pool.for_each_mut_slice(&mut bands, |band| {
            let band_rect = band.bounds();
            for y in band_rect.min_y..band_rect.max_y {
                for x in band_rect.min_x..band_rect.max_x {
                    let px = self.decode_pixel(source.sample_nrgba16(x, y));
                    band.set(x, y, px);
                }
            }
        });
        drop(bands);

        Ok(out)
    }

    /// Encodes `linear` into `sink`, covering the intersection of both bounds.
    ///
    /// Rows are encoded in parallel a strip at a time and handed to the sink in row-major order.
    /// A strip holds about [`STRIP_PIXELS`] pixels per worker.
    pub fn encode_tone_into(
        &self,
        linear: &LinearImage,
        sink: &mut (impl RasterSink + ?Sized),
        pool: &ThreadPool,
    ) {
        let rect = linear.bounds().intersection(sink.bounds());
        let _guard = tracing::trace_span!(
            "Encode tone",
            width = rect.width(),
            height = rect.height(),
        )
        .entered();
        if rect.is_empty() {
            return;
        }

        let height = rect.height() as usize;
        let strip_pixels = STRIP_PIXELS.saturating_mul(pool.num_threads());
        let strip_rows = (strip_pixels / rect.width() as usize).max(1);

        let mut bands = Vec::<EncodedBand>::new();
        let mut strip_start = 0usize;
        while strip_start < height {
            let strip_end = height.min(strip_start.saturating_add(strip_rows));
            let rows = pool.split_range(strip_start, strip_end);
            bands.resize_with(rows.len(), Default::default);
            for (band, rows) in bands.iter_mut().zip(rows) {
                band.rect = Rect::new(
                    rect.min_x,
                    rect.min_y + rows.start as i32,
                    rect.max_x,
                    rect.min_y + rows.end as i32,
                );
                band.pixels.clear();
            }

            pool.for_each_mut_slice(&mut bands, |band| {
                let band_rect = band.rect;
                band.pixels
                    .reserve((band_rect.width() * band_rect.height()) as usize);
                for y in band_rect.min_y..band_rect.max_y {
                    for x in band_rect.min_x..band_rect.max_x {
                        band.pixels.push(self.encode_pixel(linear.at(x, y)));
                    }
                }
            });

            for band in &bands {
                let band_rect = band.rect;
                let mut pixels = band.pixels.iter();
                for y in band_rect.min_y..band_rect.max_y {
                    for x in band_rect.min_x..band_rect.max_x {
                        if let Some(&px) = pixels.next() {
                            sink.put_unit(x, y, px);
                        }
                    }
                }
            }

            strip_start = strip_end;
        }
    }

    /// Encodes `linear` into a new NRGBA image with the same bounds.
    pub fn encode_tone<S: Sample>(
        &self,
        linear: &LinearImage,
        pool: &ThreadPool,
    ) -> Result<InterleavedImage<S>> {
        let mut out = InterleavedImage::new(linear.bounds(), PixelLayout::Nrgba)?;
        self.encode_tone_into(linear, &mut out, pool);
        Ok(out)
    }
}

/// Number of pixels each worker encodes before the results are flushed to the sink.
pub const STRIP_PIXELS: usize = 1 << 16;

#[derive(Default)]
struct EncodedBand {
    rect: Rect,
    pixels: Vec<Pixel>,
}

/// Decodes `source` using the RGB tone curves of `profile`.
pub fn decode_tone(
    source: &(impl RasterSource + ?Sized),
    profile: &IccProfile,
    pool: &ThreadPool,
) -> Result<LinearImage> {
    TonePipeline::from_profile(profile)?.decode_tone(source, pool)
}

/// Encodes `linear` into an NRGBA image using the RGB tone curves of `profile`.
pub fn encode_tone<S: Sample>(
    linear: &LinearImage,
    profile: &IccProfile,
    pool: &ThreadPool,
) -> Result<InterleavedImage<S>> {
    TonePipeline::from_profile(profile)?.encode_tone(linear, pool)
}
