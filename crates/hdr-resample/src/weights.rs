use std::ops::Range;

use hdr_grid::Pixel;

/// Source coordinate and its weight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Tap {
    pub coord: i32,
    pub weight: f64,
}

/// Per-axis tap table, one list of taps for every destination index.
///
/// Zero weights are dropped, and the remaining weights of each list sum to one unless all of
/// them cancel out.
#[derive(Debug, Default)]
pub(crate) struct AxisWeights {
    ranges: Vec<Range<usize>>,
    taps: Vec<Tap>,
}

impl AxisWeights {
    pub fn with_capacity(dst_len: usize, taps_per_index: usize) -> Self {
        Self {
            ranges: Vec::with_capacity(dst_len),
            taps: Vec::with_capacity(dst_len * taps_per_index),
        }
    }

    /// Every destination index reads the source index at the same offset.
    pub fn identity(src_min: i32, len: u64) -> Self {
        let mut out = Self::with_capacity(len as usize, 1);
        for idx in 0..len {
            out.push([Tap {
                coord: saturate(src_min as i64 + idx as i64),
                weight: 1.0,
            }]);
        }
        out
    }

    /// Appends the taps of the next destination index.
    pub fn push(&mut self, taps: impl IntoIterator<Item = Tap>) {
        let start = self.taps.len();
        self.taps
            .extend(taps.into_iter().filter(|tap| tap.weight != 0.0));
        let taps = &mut self.taps[start..];

        let sum = taps.iter().fold(0.0, |acc, tap| acc + tap.weight);
        if sum != 0.0 && sum != 1.0 {
            for tap in taps {
                tap.weight /= sum;
            }
        }
        self.ranges.push(start..self.taps.len());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &[Tap] {
        &self.taps[self.ranges[idx].clone()]
    }
}

/// Converts a 64-bit source coordinate, saturating at the `i32` range.
#[inline]
pub(crate) fn saturate(coord: i64) -> i32 {
    coord.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Sums `sample(coord) * weight` over the taps in order.
#[inline]
pub(crate) fn weighted_sum(taps: &[Tap], mut sample: impl FnMut(i32) -> Pixel) -> Pixel {
    // -0.0 is the additive identity, so a single unit tap reproduces the sample bit-exactly.
    let mut acc = [-0.0f64; 4];
    for tap in taps {
        let px = sample(tap.coord);
        for (acc, v) in acc.iter_mut().zip(px) {
            *acc += v * tap.weight;
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized() {
        let mut weights = AxisWeights::default();
        weights.push([
            Tap { coord: 0, weight: 1.0 },
            Tap { coord: 1, weight: 0.0 },
            Tap { coord: 2, weight: 3.0 },
        ]);
        weights.push([Tap { coord: 5, weight: 2.0 }]);
        assert_eq!(weights.len(), 2);
        assert_eq!(
            weights.get(0),
            &[Tap { coord: 0, weight: 0.25 }, Tap { coord: 2, weight: 0.75 }]
        );
        assert_eq!(weights.get(1), &[Tap { coord: 5, weight: 1.0 }]);
    }

    #[test]
    fn identity_taps() {
        let weights = AxisWeights::identity(-2, 4);
        for idx in 0..4 {
            assert_eq!(
                weights.get(idx),
                &[Tap {
                    coord: idx as i32 - 2,
                    weight: 1.0
                }]
            );
        }
    }

    #[test]
    fn sum_preserves_signed_zero() {
        let taps = [Tap { coord: 0, weight: 1.0 }];
        let px = weighted_sum(&taps, |_| [-0.0, 0.0, f64::INFINITY, -1.5]);
        assert!(px[0] == 0.0 && px[0].is_sign_negative());
        assert!(px[1] == 0.0 && px[1].is_sign_positive());
        assert_eq!(px[2], f64::INFINITY);
        assert_eq!(px[3], -1.5);
    }
}
