use crate::weights::{saturate, AxisWeights, Tap};

/// Resampling kernel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResampleKernel {
    NearestNeighbor,
    /// Endpoint-aligned bilinear interpolation.
    BiLinear,
    /// Box filter weighted by the covered area of each source pixel.
    AreaAverage,
    /// BC cubic with B = 0, C = 0.
    Hermite,
    /// BC cubic with B = 1, C = 0 (cubic B-spline).
    General,
    /// BC cubic with B = 0, C = 1/2.
    CatmullRom,
    /// BC cubic with B = 1/3, C = 1/3.
    Mitchell,
    Lanczos2,
    Lanczos3,
    Lanczos4,
}

impl ResampleKernel {
    pub const ALL: [Self; 10] = [
        Self::NearestNeighbor,
        Self::BiLinear,
        Self::AreaAverage,
        Self::Hermite,
        Self::General,
        Self::CatmullRom,
        Self::Mitchell,
        Self::Lanczos2,
        Self::Lanczos3,
        Self::Lanczos4,
    ];

    /// Returns whether the kernel runs as a horizontal pass followed by a vertical pass.
    #[inline]
    pub fn is_separable(self) -> bool {
        self.filter().is_some()
    }

    pub(crate) fn filter(self) -> Option<Filter> {
        Some(match self {
            Self::NearestNeighbor | Self::BiLinear | Self::AreaAverage => return None,
            Self::Hermite => Filter::Cubic { b: 0.0, c: 0.0 },
            Self::General => Filter::Cubic { b: 1.0, c: 0.0 },
            Self::CatmullRom => Filter::Cubic { b: 0.0, c: 0.5 },
            Self::Mitchell => Filter::Cubic {
                b: 1.0 / 3.0,
                c: 1.0 / 3.0,
            },
            Self::Lanczos2 => Filter::Lanczos(2),
            Self::Lanczos3 => Filter::Lanczos(3),
            Self::Lanczos4 => Filter::Lanczos(4),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Filter {
    Cubic { b: f64, c: f64 },
    Lanczos(u32),
}

impl Filter {
    #[inline]
    fn radius(self) -> i64 {
        match self {
            Self::Cubic { .. } => 2,
            Self::Lanczos(a) => a as i64,
        }
    }

    pub fn eval(self, t: f64) -> f64 {
        match self {
            Self::Cubic { b, c } => bc_cubic(t, b, c),
            Self::Lanczos(a) => lanczos(t, a as f64),
        }
    }

    /// Builds centre-aligned taps, `2 * radius` per destination index.
    pub fn axis_weights(self, src_min: i32, src_len: u64, dst_len: u64) -> AxisWeights {
        let radius = self.radius();
        let scale = src_len as f64 / dst_len as f64;

        let mut out = AxisWeights::with_capacity(dst_len as usize, 2 * radius as usize);
        for idx in 0..dst_len {
            let fx = (idx as f64 + 0.5) * scale - 0.5;
            let center = fx.floor();
            let center_i = center as i64;
            out.push((1 - radius..=radius).map(|k| Tap {
                coord: saturate(src_min as i64 + center_i + k),
                weight: self.eval((center + k as f64) - fx),
            }));
        }
        out
    }
}

/// Mitchell-Netravali family of cubic kernels.
#[inline]
fn bc_cubic(t: f64, b: f64, c: f64) -> f64 {
    let x = t.abs();
    if x < 1.0 {
        let x2 = x * x;
        let x3 = x2 * x;
        ((12.0 - 9.0 * b - 6.0 * c) * x3 + (-18.0 + 12.0 * b + 6.0 * c) * x2 + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        let x2 = x * x;
        let x3 = x2 * x;
        ((-b - 6.0 * c) * x3
            + (6.0 * b + 30.0 * c) * x2
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let pi_x = std::f64::consts::PI * x;
        pi_x.sin() / pi_x
    }
}

#[inline]
fn lanczos(t: f64, a: f64) -> f64 {
    if t.abs() < a {
        sinc(t) * sinc(t / a)
    } else {
        0.0
    }
}
