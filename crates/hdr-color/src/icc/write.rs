use std::borrow::Cow;

use super::{IccProfile, TagData, HEADER_SIZE, PROFILE_ID};
use crate::{SampledCurve, ToneCurve};

pub(super) fn write_profile(profile: &IccProfile) -> Vec<u8> {
    let payloads = profile
        .tags
        .iter()
        .map(|tag| tag_payload(&tag.data))
        .collect::<Vec<_>>();

    let table_end = HEADER_SIZE + 4 + 12 * payloads.len();
    let mut offset = align4(table_end);
    let mut entries = Vec::with_capacity(payloads.len());
    for payload in &payloads {
        entries.push((offset, payload.len()));
        offset = align4(offset + payload.len());
    }
    let total = offset;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&profile.header);
    out.extend_from_slice(&(payloads.len() as u32).to_be_bytes());
    for (tag, &(offset, len)) in profile.tags.iter().zip(&entries) {
        out.extend_from_slice(&tag.signature.0);
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    for payload in &payloads {
        out.resize(align4(out.len()), 0);
        out.extend_from_slice(payload);
    }
    out.resize(total, 0);

    out[0..4].copy_from_slice(&(total as u32).to_be_bytes());
    out[PROFILE_ID].fill(0);

    tracing::trace!(tags = payloads.len(), size = total, "Encoded ICC profile");
    out
}

#[inline]
fn align4(v: usize) -> usize {
    (v + 3) & !3
}

fn tag_payload(data: &TagData) -> Cow<'_, [u8]> {
    match data {
        TagData::Raw(raw) => Cow::Borrowed(raw),
        TagData::Curve(ToneCurve::Sampled(curve)) => Cow::Owned(curv_payload(curve)),
        TagData::Curve(ToneCurve::Parametric(curve)) => {
            let mut out = Vec::with_capacity(12 + curve.raw_params().len() * 4);
            out.extend_from_slice(b"para\0\0\0\0");
            out.extend_from_slice(&(curve.function() as u16).to_be_bytes());
            out.extend_from_slice(&[0, 0]);
            for &param in curve.raw_params() {
                out.extend_from_slice(&param.to_be_bytes());
            }
            Cow::Owned(out)
        }
    }
}

fn curv_payload(curve: &SampledCurve) -> Vec<u8> {
    let samples = curve.samples();
    let mut out = Vec::with_capacity(12 + samples.len() * 2);
    out.extend_from_slice(b"curv\0\0\0\0");
    out.extend_from_slice(&(samples.len() as u32).to_be_bytes());
    for &sample in samples {
        out.extend_from_slice(&sample.to_be_bytes());
    }
    out
}
