use hdr_grid::{LinearImage, Rect, Result};
use hdr_threadpool::ThreadPool;

use crate::weights::{weighted_sum, AxisWeights};

/// Horizontal pass into a temporary with the destination width and the source height, then a
/// vertical pass into `dst`.
pub(crate) fn resample_separable(
    src: &LinearImage,
    dst: &mut LinearImage,
    x_weights: &AxisWeights,
    y_weights: &AxisWeights,
    pool: &ThreadPool,
) -> Result<()> {
    let src_rect = src.bounds();
    let dst_rect = dst.bounds();
    debug_assert_eq!(x_weights.len() as u64, dst_rect.width());
    debug_assert_eq!(y_weights.len() as u64, dst_rect.height());

    let mut temp = LinearImage::new(Rect::new(
        dst_rect.min_x,
        src_rect.min_y,
        dst_rect.max_x,
        src_rect.max_y,
    ))?;

    {
        let _guard = tracing::trace_span!("Horizontal pass").entered();
        let rows = pool.split_range(0, temp.height());
        let mut bands = temp.row_bands_mut(&rows);
        pool.for_each_mut_slice(&mut bands, |band| {
            let rect = band.bounds();
            for y in rect.min_y..rect.max_y {
                for x in rect.min_x..rect.max_x {
                    let taps = x_weights.get((x as i64 - dst_rect.min_x as i64) as usize);
                    band.set(x, y, weighted_sum(taps, |sx| src.at(sx, y)));
                }
            }
        });
    }

    {
        let _guard = tracing::trace_span!("Vertical pass").entered();
        let temp = &temp;
        let rows = pool.split_range(0, dst.height());
        let mut bands = dst.row_bands_mut(&rows);
        pool.for_each_mut_slice(&mut bands, |band| {
            let rect = band.bounds();
            for y in rect.min_y..rect.max_y {
                let taps = y_weights.get((y as i64 - dst_rect.min_y as i64) as usize);
                for x in rect.min_x..rect.max_x {
                    band.set(x, y, weighted_sum(taps, |sy| temp.at(x, sy)));
                }
            }
        });
    }

    Ok(())
}
