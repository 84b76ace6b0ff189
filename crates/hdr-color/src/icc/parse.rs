use super::{read_u32, IccProfile, IccTag, TagData, TagSignature, HEADER_SIZE};
use crate::{
    curve::{ParametricCurve, ParametricFunction},
    Error, Result, ToneCurve,
};

const TAG_TABLE_START: u64 = HEADER_SIZE as u64 + 4;

pub(super) fn parse_profile(profile: &[u8]) -> Result<IccProfile> {
    if (profile.len() as u64) < TAG_TABLE_START {
        return Err(Error::TruncatedProfile("profile is too short"));
    }
    if &profile[36..40] != b"acsp" {
        return Err(Error::BadHeader("profile signature not found"));
    }

    let declared_size = read_u32(profile, 0) as u64;
    if declared_size < HEADER_SIZE as u64 {
        return Err(Error::BadHeader("declared profile size is smaller than the header"));
    }
    let limit = declared_size.min(profile.len() as u64);
    if limit < TAG_TABLE_START {
        return Err(Error::TruncatedProfile(
            "unexpected end of profile while reading tag count",
        ));
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&profile[..HEADER_SIZE]);

    let tag_count = read_u32(profile, HEADER_SIZE) as u64;
    let table_end = TAG_TABLE_START + 12 * tag_count;
    if table_end > limit {
        return Err(Error::TruncatedProfile(
            "unexpected end of profile while reading tag list",
        ));
    }

    tracing::trace!(declared_size, tag_count, "Parsing ICC profile");

    let tag_bytes = &profile[TAG_TABLE_START as usize..table_end as usize];
    let mut tags = Vec::with_capacity(tag_count as usize);
    for raw_tag in tag_bytes.chunks_exact(12) {
        let signature = TagSignature([raw_tag[0], raw_tag[1], raw_tag[2], raw_tag[3]]);
        let offset = read_u32(raw_tag, 4) as u64;
        let size = read_u32(raw_tag, 8) as u64;
        let tag_end = offset + size;
        if tag_end > limit {
            return Err(Error::TruncatedProfile(
                "unexpected end of profile while reading tag data",
            ));
        }

        tracing::trace!(%signature, offset, size, "ICC tag");
        let data = parse_tag_data(&profile[offset as usize..tag_end as usize])?;
        tags.push(IccTag { signature, data });
    }

    Ok(IccProfile { header, tags })
}

fn parse_tag_data(data: &[u8]) -> Result<TagData> {
    match data {
        [b'c', b'u', b'r', b'v', ..] => parse_curv(data).map(TagData::Curve),
        [b'p', b'a', b'r', b'a', ..] => parse_para(data).map(TagData::Curve),
        _ => Ok(TagData::Raw(data.to_vec())),
    }
}

fn parse_curv(data: &[u8]) -> Result<ToneCurve> {
    if data.len() < 12 {
        return Err(Error::BadCurve("curv tag is too short"));
    }

    let count = read_u32(data, 8) as u64;
    if 12 + count * 2 > data.len() as u64 {
        return Err(Error::BadCurve("curv tag is too short for its sample count"));
    }

    let samples = data[12..][..count as usize * 2]
        .chunks_exact(2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .collect();
    ToneCurve::sampled(samples)
}

fn parse_para(data: &[u8]) -> Result<ToneCurve> {
    if data.len() < 12 {
        return Err(Error::BadCurve("para tag is too short"));
    }

    let function = ParametricFunction::try_from(u16::from_be_bytes([data[8], data[9]]))?;
    let count = function.param_count();
    if data.len() < 12 + count * 4 {
        return Err(Error::BadCurve("para tag is too short for its function type"));
    }

    let raw = data[12..][..count * 4]
        .chunks_exact(4)
        .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect::<Vec<_>>();
    ParametricCurve::from_raw(function, &raw).map(ToneCurve::Parametric)
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;

    use super::*;

    fn header(size: u32) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&size.to_be_bytes());
        out[36..40].copy_from_slice(b"acsp");
        out
    }

    fn push_u32(out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&v.to_be_bytes());
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            parse_profile(&[0u8; 131]),
            Err(Error::TruncatedProfile(_))
        ));
        assert!(matches!(parse_profile(&[]), Err(Error::TruncatedProfile(_))));
    }

    #[test]
    fn bad_header() {
        let mut profile = header(132);
        push_u32(&mut profile, 0);
        profile[36] = b'x';
        assert!(matches!(parse_profile(&profile), Err(Error::BadHeader(_))));

        let mut profile = header(100);
        push_u32(&mut profile, 0);
        assert!(matches!(parse_profile(&profile), Err(Error::BadHeader(_))));
    }

    #[test]
    fn empty_tag_table() {
        let mut profile = header(132);
        push_u32(&mut profile, 0);
        let parsed = parse_profile(&profile).unwrap();
        assert!(parsed.tags().is_empty());
    }

    #[test]
    fn tag_past_end() {
        // 200-byte blob declaring 200 bytes, with a tag at offset 150 of size 100.
        let mut profile = header(200);
        push_u32(&mut profile, 1);
        profile.extend_from_slice(b"rTRC");
        push_u32(&mut profile, 150);
        push_u32(&mut profile, 100);
        profile.resize(200, 0);
        assert!(matches!(
            parse_profile(&profile),
            Err(Error::TruncatedProfile(_))
        ));
    }

    #[test]
    fn tag_end_overflow() {
        let mut profile = header(200);
        push_u32(&mut profile, 1);
        profile.extend_from_slice(b"rTRC");
        push_u32(&mut profile, u32::MAX);
        push_u32(&mut profile, u32::MAX);
        profile.resize(200, 0);
        assert!(matches!(
            parse_profile(&profile),
            Err(Error::TruncatedProfile(_))
        ));
    }

    #[test]
    fn declared_size_is_not_trusted() {
        // Declares more than the blob holds.
        let mut profile = header(u32::MAX);
        push_u32(&mut profile, 1);
        profile.extend_from_slice(b"rTRC");
        push_u32(&mut profile, 144);
        push_u32(&mut profile, 64);
        profile.resize(160, 0);
        assert!(matches!(
            parse_profile(&profile),
            Err(Error::TruncatedProfile(_))
        ));

        // Declares less than the blob holds; tags must lie within the declared size.
        let mut profile = header(150);
        push_u32(&mut profile, 1);
        profile.extend_from_slice(b"rTRC");
        push_u32(&mut profile, 144);
        push_u32(&mut profile, 12);
        profile.resize(200, 0);
        assert!(matches!(
            parse_profile(&profile),
            Err(Error::TruncatedProfile(_))
        ));
    }

    #[test]
    fn tag_table_past_end() {
        let mut profile = header(140);
        push_u32(&mut profile, 1);
        profile.resize(140, 0);
        assert!(matches!(
            parse_profile(&profile),
            Err(Error::TruncatedProfile(_))
        ));
    }

    #[test]
    fn curv_payloads() {
        let mut data = b"curv\0\0\0\0".to_vec();
        push_u32(&mut data, 3);
        data.extend_from_slice(&[0, 0, 0x80, 0, 0xff, 0xff]);
        let TagData::Curve(ToneCurve::Sampled(curve)) = parse_tag_data(&data).unwrap() else {
            panic!()
        };
        assert_eq!(curve.samples(), &[0, 0x8000, 0xffff]);

        data.truncate(16);
        assert!(matches!(parse_tag_data(&data), Err(Error::BadCurve(_))));
        assert!(matches!(parse_tag_data(b"curv\0\0"), Err(Error::BadCurve(_))));

        let mut data = b"curv\0\0\0\0".to_vec();
        push_u32(&mut data, u32::MAX);
        assert!(matches!(parse_tag_data(&data), Err(Error::BadCurve(_))));

        let mut data = b"curv\0\0\0\0".to_vec();
        push_u32(&mut data, 1);
        data.extend_from_slice(&[0, 0]);
        assert!(matches!(parse_tag_data(&data), Err(Error::BadCurve(_))));
    }

    #[test]
    fn para_payloads() {
        let mut data = b"para\0\0\0\0\0\0\0\0".to_vec();
        push_u32(&mut data, 0x26666);
        let TagData::Curve(ToneCurve::Parametric(curve)) = parse_tag_data(&data).unwrap() else {
            panic!()
        };
        assert_eq!(curve.function(), ParametricFunction::Gamma);
        assert_eq!(curve.raw_params(), &[0x26666]);

        let mut data = b"para\0\0\0\0\0\x03\0\0".to_vec();
        push_u32(&mut data, 0x26666);
        assert!(matches!(parse_tag_data(&data), Err(Error::BadCurve(_))));

        let mut data = b"para\0\0\0\0\0\x07\0\0".to_vec();
        push_u32(&mut data, 0x10000);
        assert!(matches!(parse_tag_data(&data), Err(Error::BadCurve(_))));
    }

    #[test]
    fn unknown_tags_are_kept() {
        let data = b"XYZ \0\0\0\0\0\0\xf6\xd6".to_vec();
        assert_eq!(parse_tag_data(&data).unwrap(), TagData::Raw(data.clone()));
        assert_eq!(parse_tag_data(b"").unwrap(), TagData::Raw(Vec::new()));
    }

    #[test]
    fn random_bytes_never_panic() {
        let mut rng = SmallRng::seed_from_u64(0x1cc);
        let valid = IccProfile::srgb().encode();
        for _ in 0..2000 {
            let len = rng.gen_range(0..512);
            let mut data = (0..len).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
            if data.len() >= 40 && rng.gen_bool(0.5) {
                data[36..40].copy_from_slice(b"acsp");
            }
            let _ = parse_profile(&data);

            let mut mutated = valid.clone();
            for _ in 0..rng.gen_range(1..8) {
                let idx = rng.gen_range(0..mutated.len());
                mutated[idx] = rng.gen();
            }
            mutated.truncate(rng.gen_range(0..=mutated.len()));
            let _ = parse_profile(&mutated);
        }
    }
}
