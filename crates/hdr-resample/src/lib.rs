//! Geometric resamplers over [`LinearImage`].
//!
//! Every kernel reads the source with clamp-to-edge semantics, accumulates in `f64` in a fixed
//! order, and narrows the result to half-float. Output is bit-identical regardless of the thread
//! pool. An axis whose source and destination extents match is copied as is.
use hdr_grid::{LinearImage, Rect, Result};
use hdr_threadpool::ThreadPool;

mod area;
mod bilinear;
mod direct;
mod kernel;
mod nearest;
mod separable;
mod weights;

pub use kernel::ResampleKernel;
use weights::AxisWeights;

/// Resampling kernel bundled with the thread pool it runs on.
#[derive(Debug, Clone)]
pub struct Resampler {
    kernel: ResampleKernel,
    pool: ThreadPool,
}

impl Resampler {
    pub fn new(kernel: ResampleKernel, pool: ThreadPool) -> Self {
        Self { kernel, pool }
    }

    #[inline]
    pub fn kernel(&self) -> ResampleKernel {
        self.kernel
    }

    #[inline]
    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    pub fn resample(&self, src: &LinearImage, dst_bounds: Rect) -> Result<LinearImage> {
        resample(src, dst_bounds, self.kernel, &self.pool)
    }

    pub fn resample_into(&self, src: &LinearImage, dst: &mut LinearImage) -> Result<()> {
        resample_into(src, dst, self.kernel, &self.pool)
    }
}

/// Resamples `src` into a new image with bounds `dst_bounds`.
///
/// Fails only if the destination or the intermediate image cannot be allocated.
pub fn resample(
    src: &LinearImage,
    dst_bounds: Rect,
    kernel: ResampleKernel,
    pool: &ThreadPool,
) -> Result<LinearImage> {
    let mut dst = LinearImage::new(dst_bounds)?;
    resample_into(src, &mut dst, kernel, pool)?;
    Ok(dst)
}

/// Resamples `src` to fill the whole of `dst`.
///
/// An empty source yields a transparent black destination.
pub fn resample_into(
    src: &LinearImage,
    dst: &mut LinearImage,
    kernel: ResampleKernel,
    pool: &ThreadPool,
) -> Result<()> {
    let src_rect = src.bounds();
    let dst_rect = dst.bounds();
    let _guard = tracing::trace_span!(
        "Resample",
        ?kernel,
        src_width = src_rect.width(),
        src_height = src_rect.height(),
        dst_width = dst_rect.width(),
        dst_height = dst_rect.height(),
    )
    .entered();

    if dst.is_empty() {
        return Ok(());
    }
    if src.is_empty() {
        dst.fill([0.0; 4]);
        return Ok(());
    }

    let x_weights = axis_weights(kernel, src_rect.min_x, src_rect.width(), dst_rect.width());
    let y_weights = axis_weights(kernel, src_rect.min_y, src_rect.height(), dst_rect.height());

    if kernel.is_separable() {
        tracing::debug!(?kernel, "Running separable resampler");
        separable::resample_separable(src, dst, &x_weights, &y_weights, pool)
    } else {
        tracing::debug!(?kernel, "Running direct resampler");
        direct::resample_direct(src, dst, &x_weights, &y_weights, pool);
        Ok(())
    }
}

fn axis_weights(kernel: ResampleKernel, src_min: i32, src_len: u64, dst_len: u64) -> AxisWeights {
    if src_len == dst_len {
        return AxisWeights::identity(src_min, src_len);
    }

    if let Some(filter) = kernel.filter() {
        return filter.axis_weights(src_min, src_len, dst_len);
    }
    match kernel {
        ResampleKernel::BiLinear => bilinear::axis_weights(src_min, src_len, dst_len),
        ResampleKernel::AreaAverage => area::axis_weights(src_min, src_len, dst_len),
        _ => nearest::axis_weights(src_min, src_len, dst_len),
    }
}

#[cfg(test)]
mod tests {
    use half::f16;
    use rand::prelude::*;

    use super::*;

    fn pools() -> Vec<ThreadPool> {
        let mut pools = vec![ThreadPool::none()];
        #[cfg(feature = "rayon")]
        {
            pools.push(ThreadPool::with_num_threads(2));
            pools.push(ThreadPool::with_num_threads(5));
        }
        pools
    }

    fn random_image(rng: &mut SmallRng, rect: Rect) -> LinearImage {
        let mut image = LinearImage::new(rect).unwrap();
        for y in rect.min_y..rect.max_y {
            for x in rect.min_x..rect.max_x {
                let px = std::array::from_fn(|_| f16::from_f32(rng.gen_range(-0.5f32..4.0)));
                image.set_f16(x, y, px);
            }
        }
        image
    }

    #[test]
    fn same_size_is_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let rect = Rect::new(-3, 5, 14, 16);
        let mut src = random_image(&mut rng, rect);
        src.set_f16(0, 6, [f16::INFINITY, f16::NEG_ZERO, f16::MAX, f16::MIN_POSITIVE_SUBNORMAL]);

        for kernel in ResampleKernel::ALL {
            let out = resample(&src, rect, kernel, &ThreadPool::none()).unwrap();
            assert_eq!(out.pixels(), src.pixels(), "{kernel:?}");

            // Bounds may move; only extents matter.
            let moved = rect.translate_to(100, -50);
            let out = resample(&src, moved, kernel, &ThreadPool::none()).unwrap();
            assert_eq!(out.pixels(), src.pixels(), "{kernel:?}");
        }
    }

    #[test]
    fn lanczos3_single_white_pixel() {
        let rect = Rect::from_size(16, 16);
        let mut src = LinearImage::new(rect).unwrap();
        src.set(8, 8, [1.0, 1.0, 1.0, 1.0]);
        let out = resample(&src, rect, ResampleKernel::Lanczos3, &ThreadPool::none()).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn area_average_checkerboard() {
        let rect = Rect::from_size(4, 4);
        let mut src = LinearImage::new(rect).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let v = ((x + y) % 2) as f64;
                src.set(x, y, [v, v, v, 1.0]);
            }
        }

        let out = resample(
            &src,
            Rect::from_size(2, 2),
            ResampleKernel::AreaAverage,
            &ThreadPool::none(),
        )
        .unwrap();
        for y in 0..2 {
            for x in 0..2 {
                let [r, g, b, a] = out.at_f16(x, y);
                for v in [r, g, b] {
                    assert!(v.to_bits().abs_diff(f16::from_f32(0.5).to_bits()) <= 1);
                }
                assert_eq!(a, f16::ONE);
            }
        }
    }

    #[test]
    fn deterministic_across_pools() {
        let mut rng = SmallRng::seed_from_u64(2);
        let src = random_image(&mut rng, Rect::new(0, 0, 37, 29));
        let pools = pools();
        for kernel in ResampleKernel::ALL {
            for dst in [Rect::new(0, 0, 61, 17), Rect::new(-4, 3, 9, 50)] {
                let outputs = pools
                    .iter()
                    .map(|pool| resample(&src, dst, kernel, pool).unwrap())
                    .collect::<Vec<_>>();
                for output in &outputs {
                    assert_eq!(output, &outputs[0], "{kernel:?}");
                }
                let again = resample(&src, dst, kernel, &pools[0]).unwrap();
                assert_eq!(again, outputs[0]);
            }
        }
    }

    #[test]
    fn constant_image_is_preserved() {
        let mut src = LinearImage::new(Rect::from_size(13, 7)).unwrap();
        src.fill([0.25, 2.0, 0.5, 1.0]);
        for kernel in ResampleKernel::ALL {
            for dst in [Rect::from_size(5, 3), Rect::from_size(40, 19)] {
                let out = resample(&src, dst, kernel, &ThreadPool::none()).unwrap();
                for y in 0..dst.max_y {
                    for x in 0..dst.max_x {
                        let px = out.at(x, y);
                        for (v, expected) in px.iter().zip([0.25, 2.0, 0.5, 1.0]) {
                            assert!((v - expected).abs() < 2e-3, "{kernel:?}: {px:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn nearest_picks_endpoints() {
        let mut src = LinearImage::new(Rect::from_size(5, 1)).unwrap();
        for x in 0..5 {
            src.set(x, 0, [x as f64, 0.0, 0.0, 1.0]);
        }
        let out = resample(
            &src,
            Rect::from_size(3, 1),
            ResampleKernel::NearestNeighbor,
            &ThreadPool::none(),
        )
        .unwrap();
        assert_eq!(out.at(0, 0)[0], 0.0);
        assert_eq!(out.at(1, 0)[0], 2.0);
        assert_eq!(out.at(2, 0)[0], 4.0);
    }

    #[test]
    fn ringing_is_kept() {
        let mut src = LinearImage::new(Rect::from_size(8, 1)).unwrap();
        for x in 4..8 {
            src.set(x, 0, [1.0, 1.0, 1.0, 1.0]);
        }
        let out = resample(
            &src,
            Rect::from_size(29, 1),
            ResampleKernel::Lanczos3,
            &ThreadPool::none(),
        )
        .unwrap();
        let min = (0..29).map(|x| out.at(x, 0)[0]).fold(f64::INFINITY, f64::min);
        assert!(min < 0.0);
    }

    #[test]
    fn empty_inputs() {
        let src = LinearImage::new(Rect::default()).unwrap();
        let out = resample(
            &src,
            Rect::from_size(3, 2),
            ResampleKernel::Mitchell,
            &ThreadPool::none(),
        )
        .unwrap();
        assert!(out.pixels().iter().all(|&b| b == 0));

        let mut src = LinearImage::new(Rect::from_size(3, 2)).unwrap();
        src.fill([1.0; 4]);
        let out = resample(
            &src,
            Rect::new(5, 5, 5, 9),
            ResampleKernel::Lanczos2,
            &ThreadPool::none(),
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn destination_overflow() {
        let src = LinearImage::new(Rect::from_size(1, 1)).unwrap();
        let result = resample(
            &src,
            Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX),
            ResampleKernel::NearestNeighbor,
            &ThreadPool::none(),
        );
        assert!(matches!(result, Err(hdr_grid::Error::ArithmeticOverflow { .. })));
    }
}
