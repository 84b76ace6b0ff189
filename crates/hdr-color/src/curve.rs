//! Tone reproduction curves.
//!
//! A curve maps an encoded value in `[0, 1]` to linear light (`decode`), and back (`encode`).
use crate::{Error, Result};

/// Tone reproduction curve of a single channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ToneCurve {
    Sampled(SampledCurve),
    Parametric(ParametricCurve),
}

impl ToneCurve {
    /// Curve that maps every value to itself.
    pub fn identity() -> Self {
        Self::Sampled(SampledCurve {
            samples: Vec::new(),
        })
    }

    /// Pure power curve, stored as u8.8 fixed-point gamma.
    pub fn gamma(gamma: f64) -> Result<Self> {
        let fixed = (gamma * 256.0).round();
        if !(1.0..=u16::MAX as f64).contains(&fixed) {
            return Err(Error::BadCurve("gamma out of range"));
        }
        SampledCurve::new(vec![fixed as u16]).map(Self::Sampled)
    }

    pub fn sampled(samples: Vec<u16>) -> Result<Self> {
        SampledCurve::new(samples).map(Self::Sampled)
    }

    /// The sRGB transfer curve as a type 3 parametric curve, with parameters quantized to s15.16
    /// as they are stored in ICC profiles.
    ///
    /// [`TonePipeline`](crate::TonePipeline) evaluates curves equal to this one with the exact
    /// sRGB formula.
    pub fn srgb() -> Self {
        Self::Parametric(ParametricCurve::srgb())
    }

    pub fn is_identity(&self) -> bool {
        match self {
            Self::Sampled(curve) => match *curve.samples {
                [] => true,
                [gamma] => gamma == 0x100,
                [0, 0xffff] => true,
                _ => false,
            },
            Self::Parametric(curve) => {
                curve.function == ParametricFunction::Gamma && curve.raw[0] == 0x10000
            }
        }
    }

    /// Returns whether this is the sRGB transfer curve, up to s15.16 quantization.
    pub fn is_srgb(&self) -> bool {
        match self {
            Self::Parametric(curve) => *curve == ParametricCurve::srgb(),
            Self::Sampled(_) => false,
        }
    }

    /// Converts an encoded value to linear light.
    pub fn decode(&self, v: f64) -> f64 {
        match self {
            Self::Sampled(curve) => curve.decode(v),
            Self::Parametric(curve) => curve.decode(v),
        }
    }

    /// Converts linear light to an encoded value in `[0, 1]`.
    pub fn encode(&self, v: f64) -> f64 {
        match self {
            Self::Sampled(curve) => curve.encode(v),
            Self::Parametric(curve) => curve.encode(v),
        }
    }
}

/// Curve given as uniformly spaced 16-bit samples (ICC `curv`).
///
/// No samples means identity, a single sample is a u8.8 gamma, and two or more samples form a
/// piecewise linear lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampledCurve {
    samples: Vec<u16>,
}

impl SampledCurve {
    pub fn new(samples: Vec<u16>) -> Result<Self> {
        if samples == [0] {
            return Err(Error::BadCurve("zero gamma"));
        }
        Ok(Self { samples })
    }

    #[inline]
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Gamma value if the curve is a single-sample power curve.
    pub fn gamma(&self) -> Option<f64> {
        match *self.samples {
            [gamma] => Some(gamma as f64 / 256.0),
            _ => None,
        }
    }

    fn decode(&self, v: f64) -> f64 {
        let v = clamp_unit(v);
        let s = &*self.samples;
        match s.len() {
            0 => v,
            1 => v.powf(s[0] as f64 / 256.0),
            n => {
                let pos = v * (n - 1) as f64;
                let idx = pos.floor() as usize;
                if idx >= n - 1 {
                    return s[n - 1] as f64 / 65535.0;
                }

                let frac = pos - idx as f64;
                let lo = s[idx] as f64;
                let hi = s[idx + 1] as f64;
                (lo + frac * (hi - lo)) / 65535.0
            }
        }
    }

    fn encode(&self, v: f64) -> f64 {
        let v = clamp_unit(v);
        let s = &*self.samples;
        match s.len() {
            0 => v,
            1 => clamp_unit(v.powf(256.0 / s[0] as f64)),
            n => {
                let last = (n - 1) as f64;
                let target = v * 65535.0;
                let idx = s.partition_point(|&x| (x as f64) < target);
                if idx >= n {
                    return 1.0;
                }
                if idx == 0 {
                    return 0.0;
                }

                let hi = s[idx] as f64;
                let lo = s[idx - 1] as f64;
                if hi == target || hi == lo {
                    return idx as f64 / last;
                }
                let frac = (target - lo) / (hi - lo);
                clamp_unit(((idx - 1) as f64 + frac) / last)
            }
        }
    }
}

/// Function type of a parametric curve (ICC `para`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ParametricFunction {
    /// `Y = X^g`
    Gamma = 0,
    /// `Y = (aX + b)^g`, zero below `-b/a`.
    Cie122 = 1,
    /// `Y = (aX + b)^g + c`, `c` below `-b/a`.
    Iec61966_3 = 2,
    /// `Y = (aX + b)^g` if `X >= d`, `cX` otherwise.
    Srgb = 3,
    /// `Y = (aX + b)^g + e` if `X >= d`, `cX + f` otherwise.
    General = 4,
}

impl ParametricFunction {
    /// Number of parameters this function reads.
    pub fn param_count(self) -> usize {
        match self {
            Self::Gamma => 1,
            Self::Cie122 => 3,
            Self::Iec61966_3 => 4,
            Self::Srgb => 5,
            Self::General => 7,
        }
    }
}

impl TryFrom<u16> for ParametricFunction {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Ok(match value {
            0 => Self::Gamma,
            1 => Self::Cie122,
            2 => Self::Iec61966_3,
            3 => Self::Srgb,
            4 => Self::General,
            _ => return Err(Error::BadCurve("unknown parametric function type")),
        })
    }
}

/// Parametric curve with s15.16 fixed-point parameters `g, a, b, c, d, e, f`.
///
/// Raw parameters are kept so that the curve is written back bit-exactly; equality compares the
/// function type and the raw parameters the function uses.
#[derive(Debug, Copy, Clone)]
pub struct ParametricCurve {
    function: ParametricFunction,
    raw: [i32; 7],
    params: [f64; 7],
}

impl PartialEq for ParametricCurve {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function && self.raw_params() == other.raw_params()
    }
}

impl Eq for ParametricCurve {}

impl ParametricCurve {
    /// Creates a curve from s15.16 fixed-point parameters. Extra parameters are ignored.
    pub fn from_raw(function: ParametricFunction, raw: &[i32]) -> Result<Self> {
        let count = function.param_count();
        if raw.len() < count {
            return Err(Error::BadCurve("too few parametric curve parameters"));
        }

        let mut used = [0i32; 7];
        used[..count].copy_from_slice(&raw[..count]);
        Ok(Self::with_raw(function, used))
    }

    /// Creates a curve from real-valued parameters, quantizing them to s15.16.
    pub fn from_params(function: ParametricFunction, params: &[f64]) -> Result<Self> {
        let count = function.param_count();
        if params.len() < count {
            return Err(Error::BadCurve("too few parametric curve parameters"));
        }
        if params[..count].iter().any(|v| !v.is_finite()) {
            return Err(Error::BadCurve("non-finite parametric curve parameter"));
        }

        let raw = params[..count]
            .iter()
            .map(|&v| quantize(v))
            .collect::<Vec<_>>();
        Self::from_raw(function, &raw)
    }

    fn srgb() -> Self {
        let mut raw = [0i32; 7];
        for (out, &v) in raw.iter_mut().zip(&crate::tf::srgb::PARAMS) {
            *out = quantize(v);
        }
        Self::with_raw(ParametricFunction::Srgb, raw)
    }

    /// `raw` must be zero past the parameter count of `function`.
    fn with_raw(function: ParametricFunction, raw: [i32; 7]) -> Self {
        Self {
            function,
            raw,
            params: raw.map(|v| v as f64 / 65536.0),
        }
    }

    #[inline]
    pub fn function(&self) -> ParametricFunction {
        self.function
    }

    /// Raw s15.16 parameters used by the function.
    #[inline]
    pub fn raw_params(&self) -> &[i32] {
        &self.raw[..self.function.param_count()]
    }

    #[inline]
    pub fn params(&self) -> &[f64] {
        &self.params[..self.function.param_count()]
    }

    fn decode(&self, v: f64) -> f64 {
        use ParametricFunction::*;

        let x = clamp_unit(v);
        let [g, a, b, c, d, e, f] = self.params;
        match self.function {
            Gamma => x.powf(g),
            Cie122 => power_or(a * x + b, g, 0.0),
            Iec61966_3 => power_or(a * x + b, g, 0.0) + c,
            Srgb => {
                if x >= d {
                    power_or(a * x + b, g, 0.0)
                } else {
                    c * x
                }
            }
            General => {
                if x >= d {
                    power_or(a * x + b, g, 0.0) + e
                } else {
                    c * x + f
                }
            }
        }
    }

    fn encode(&self, v: f64) -> f64 {
        use ParametricFunction::*;

        let y = clamp_unit(v);
        let [g, a, b, c, d, e, f] = self.params;
        let x = match self.function {
            Gamma => root(y, g),
            Cie122 => (root(y, g) - b) / a,
            Iec61966_3 => (root(y - c, g) - b) / a,
            Srgb => {
                if y >= self.decode(d) {
                    (root(y, g) - b) / a
                } else {
                    y / c
                }
            }
            General => {
                if y >= self.decode(d) {
                    (root(y - e, g) - b) / a
                } else {
                    (y - f) / c
                }
            }
        };
        clamp_unit(x)
    }
}

fn quantize(v: f64) -> i32 {
    (v * 65536.0).round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Clamps to `[0, 1]`, mapping NaN to zero.
#[inline]
pub(crate) fn clamp_unit(v: f64) -> f64 {
    if v >= 1.0 {
        1.0
    } else if v > 0.0 {
        v
    } else {
        0.0
    }
}

#[inline]
fn power_or(base: f64, exp: f64, fallback: f64) -> f64 {
    if base >= 0.0 {
        base.powf(exp)
    } else {
        fallback
    }
}

#[inline]
fn root(v: f64, exp: f64) -> f64 {
    if v > 0.0 {
        v.powf(1.0 / exp)
    } else {
        0.0
    }
}
