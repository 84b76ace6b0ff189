use crate::weights::{saturate, AxisWeights, Tap};

/// Endpoint-aligned source index, `round(idx * (src_len - 1) / (dst_len - 1))`.
#[inline]
pub(crate) fn map_index(idx: u64, src_len: u64, dst_len: u64) -> u64 {
    if dst_len <= 1 {
        return 0;
    }
    let num = idx as u128 * (src_len as u128 - 1);
    let den = dst_len as u128 - 1;
    ((2 * num + den) / (2 * den)) as u64
}

pub(crate) fn axis_weights(src_min: i32, src_len: u64, dst_len: u64) -> AxisWeights {
    let mut out = AxisWeights::with_capacity(dst_len as usize, 1);
    for idx in 0..dst_len {
        out.push([Tap {
            coord: saturate(src_min as i64 + map_index(idx, src_len, dst_len) as i64),
            weight: 1.0,
        }]);
    }
    out
}
