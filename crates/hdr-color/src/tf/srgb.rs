//! The sRGB transfer curve (IEC 61966-2-1).
//!
//! Integer conversions go through lookup tables which are built on first use and shared by every
//! thread afterwards.
use std::sync::OnceLock;

/// Parameters `g, a, b, c, d` of the sRGB curve as an ICC type 3 parametric curve.
pub const PARAMS: [f64; 5] = [2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045];

const LINEAR_THRESHOLD: f64 = 0.04045 / 12.92;

static ENCODED_TO_LINEAR_8: OnceLock<Box<[u16]>> = OnceLock::new();
static ENCODED_TO_LINEAR_16: OnceLock<Box<[u16]>> = OnceLock::new();
static LINEAR_TO_ENCODED_16: OnceLock<Box<[u16]>> = OnceLock::new();

/// Converts an sRGB encoded value to linear light. Input is clamped to `[0, 1]`, and both
/// endpoints map exactly.
pub fn decode(v: f64) -> f64 {
    let [g, a, b, c, d] = PARAMS;
    let v = crate::curve::clamp_unit(v);
    if v == 1.0 {
        1.0
    } else if v >= d {
        (a * v + b).powf(g)
    } else {
        c * v
    }
}

/// Converts linear light to an sRGB encoded value. Input is clamped to `[0, 1]`.
pub fn encode(v: f64) -> f64 {
    let [g, a, b, c, _] = PARAMS;
    let v = crate::curve::clamp_unit(v);
    let out = if v == 1.0 {
        1.0
    } else if v > LINEAR_THRESHOLD {
        (v.powf(1.0 / g) - b) / a
    } else {
        v / c
    };
    crate::curve::clamp_unit(out)
}

fn build_table(len: usize, f: impl Fn(f64) -> f64) -> Box<[u16]> {
    let _guard = tracing::trace_span!("Build sRGB table", len).entered();

    let last = (len - 1) as f64;
    let mut table = (0..len)
        .map(|idx| (f(idx as f64 / last) * 65535.0).round() as u16)
        .collect::<Box<[u16]>>();
    table[0] = 0;
    table[len - 1] = 0xffff;
    table
}

/// 8-bit encoded value to 16-bit linear value.
pub fn encoded_to_linear_table_8() -> &'static [u16] {
    ENCODED_TO_LINEAR_8.get_or_init(|| build_table(256, decode))
}

/// 16-bit encoded value to 16-bit linear value.
pub fn encoded_to_linear_table_16() -> &'static [u16] {
    ENCODED_TO_LINEAR_16.get_or_init(|| build_table(65536, decode))
}

/// 16-bit linear value to 16-bit encoded value.
pub fn linear_to_encoded_table_16() -> &'static [u16] {
    LINEAR_TO_ENCODED_16.get_or_init(|| build_table(65536, encode))
}

#[inline]
pub fn decode_u8(v: u8) -> u16 {
    encoded_to_linear_table_8()[v as usize]
}

#[inline]
pub fn decode_u16(v: u16) -> u16 {
    encoded_to_linear_table_16()[v as usize]
}

#[inline]
pub fn encode_u16(v: u16) -> u16 {
    linear_to_encoded_table_16()[v as usize]
}

/// 16-bit linear value to 8-bit encoded value, rounded to nearest.
#[inline]
pub fn encode_u8(v: u16) -> u8 {
    ((encode_u16(v) as u32 * 255 + 32767) / 65535) as u8
}
