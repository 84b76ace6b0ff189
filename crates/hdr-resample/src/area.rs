use crate::weights::{saturate, AxisWeights, Tap};

/// Covers `[idx * src_len / dst_len, (idx + 1) * src_len / dst_len)` of the source, weighting
/// each source index by the covered fraction.
pub(crate) fn axis_weights(src_min: i32, src_len: u64, dst_len: u64) -> AxisWeights {
    let span = src_len.div_ceil(dst_len) as usize + 1;
    let mut out = AxisWeights::with_capacity(dst_len as usize, span);
    for idx in 0..dst_len {
        let start = (idx as u128 * src_len as u128) as f64 / dst_len as f64;
        let end = ((idx + 1) as u128 * src_len as u128) as f64 / dst_len as f64;
        let first = start.floor() as u64;
        let last = (end.ceil() as u64).min(src_len).max(first + 1);

        out.push((first..last).map(|src_idx| {
            let lo = start.max(src_idx as f64);
            let hi = end.min((src_idx + 1) as f64);
            Tap {
                coord: saturate(src_min as i64 + src_idx as i64),
                weight: (hi - lo).max(0.0),
            }
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halve() {
        let weights = axis_weights(0, 4, 2);
        assert_eq!(
            weights.get(1),
            &[Tap { coord: 2, weight: 0.5 }, Tap { coord: 3, weight: 0.5 }]
        );
    }

    #[test]
    fn partial_coverage() {
        // Destination 0 covers [0, 1.5): all of source 0 and half of source 1.
        let weights = axis_weights(0, 3, 2);
        let row = weights.get(0);
        assert_eq!(row.len(), 2);
        assert!((row[0].weight - 2.0 / 3.0).abs() < 1e-12);
        assert!((row[1].weight - 1.0 / 3.0).abs() < 1e-12);

        let row = weights.get(1);
        assert_eq!(row[0].coord, 1);
        assert_eq!(row[1].coord, 2);
    }

    #[test]
    fn upscale_reads_single_pixel() {
        let weights = axis_weights(0, 2, 8);
        for idx in 0..8 {
            let row = weights.get(idx);
            assert_eq!(row.len(), 1);
            assert_eq!(row[0].coord, idx as i32 / 4);
            assert_eq!(row[0].weight, 1.0);
        }
    }
}
