use crate::weights::{saturate, AxisWeights, Tap};

/// Two taps per index around `idx * (src_len - 1) / (dst_len - 1)`.
pub(crate) fn axis_weights(src_min: i32, src_len: u64, dst_len: u64) -> AxisWeights {
    let scale = if dst_len <= 1 {
        0.0
    } else {
        (src_len - 1) as f64 / (dst_len - 1) as f64
    };

    let mut out = AxisWeights::with_capacity(dst_len as usize, 2);
    for idx in 0..dst_len {
        let fx = idx as f64 * scale;
        let base = fx.floor();
        let frac = fx - base;
        let coord = src_min as i64 + base as i64;
        out.push([
            Tap {
                coord: saturate(coord),
                weight: 1.0 - frac,
            },
            Tap {
                coord: saturate(coord + 1),
                weight: frac,
            },
        ]);
    }
    out
}
