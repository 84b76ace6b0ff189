use hdr_grid::LinearImage;
use hdr_threadpool::ThreadPool;

use crate::weights::{weighted_sum, AxisWeights};

/// Resamples with the product of horizontal and vertical taps, reading the source directly.
pub(crate) fn resample_direct(
    src: &LinearImage,
    dst: &mut LinearImage,
    x_weights: &AxisWeights,
    y_weights: &AxisWeights,
    pool: &ThreadPool,
) {
    let dst_rect = dst.bounds();
    debug_assert_eq!(x_weights.len() as u64, dst_rect.width());
    debug_assert_eq!(y_weights.len() as u64, dst_rect.height());
    let rows = pool.split_range(0, dst.height());
    let mut bands = dst.row_bands_mut(&rows);
    pool.for_each_mut_slice(&mut bands, |band| {
        let rect = band.bounds();
        for y in rect.min_y..rect.max_y {
            let y_taps = y_weights.get((y as i64 - dst_rect.min_y as i64) as usize);
            for x in rect.min_x..rect.max_x {
                let x_taps = x_weights.get((x as i64 - dst_rect.min_x as i64) as usize);
                let px = weighted_sum(y_taps, |sy| weighted_sum(x_taps, |sx| src.at(sx, sy)));
                band.set(x, y, px);
            }
        }
    });
}
