//! ICC profile decoding and encoding.
//!
//! Only the structure of a profile is interpreted: the header is kept as raw bytes, and tags are
//! either tone curves (`curv`, `para`) or opaque blobs preserved byte for byte.
use crate::{Error, Result, ToneCurve};

mod parse;
mod write;

/// Size of the ICC profile header.
pub const HEADER_SIZE: usize = 128;

const PROFILE_ID: std::ops::Range<usize> = 84..100;

/// Four-byte tag signature.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct TagSignature(pub [u8; 4]);

impl TagSignature {
    pub const RED_TRC: Self = Self(*b"rTRC");
    pub const GREEN_TRC: Self = Self(*b"gTRC");
    pub const BLUE_TRC: Self = Self(*b"bTRC");
    pub const GRAY_TRC: Self = Self(*b"kTRC");
}

impl std::fmt::Display for TagSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TagSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TagSignature({self})")
    }
}

/// Tag payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    Curve(ToneCurve),
    /// Unrecognized tag type, including the type signature.
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IccTag {
    pub signature: TagSignature,
    pub data: TagData,
}

/// Parsed ICC profile.
///
/// Two profiles compare equal if their headers, except for the size field and the profile ID,
/// and their tag lists are equal.
#[derive(Debug, Clone)]
pub struct IccProfile {
    header: [u8; HEADER_SIZE],
    tags: Vec<IccTag>,
}

impl PartialEq for IccProfile {
    fn eq(&self, other: &Self) -> bool {
        self.header[4..PROFILE_ID.start] == other.header[4..PROFILE_ID.start]
            && self.header[PROFILE_ID.end..] == other.header[PROFILE_ID.end..]
            && self.tags == other.tags
    }
}

impl IccProfile {
    /// Parses an ICC profile blob.
    ///
    /// The declared profile size is never trusted beyond the end of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        parse::parse_profile(data)
    }

    /// Serializes the profile, with the size field updated and the profile ID zeroed.
    pub fn encode(&self) -> Vec<u8> {
        write::write_profile(self)
    }

    /// Creates a minimal RGB display profile with the given tone curves.
    pub fn new_rgb(curves: [ToneCurve; 3]) -> Self {
        let mut header = [0u8; HEADER_SIZE];
        // Version 4.3
        header[8..12].copy_from_slice(&[4, 0x30, 0, 0]);
        header[12..16].copy_from_slice(b"mntr");
        header[16..20].copy_from_slice(b"RGB ");
        header[20..24].copy_from_slice(b"XYZ ");
        header[36..40].copy_from_slice(b"acsp");
        // D50 PCS illuminant
        for (idx, v) in [0xf6d6i32, 0x10000, 0xd32d].into_iter().enumerate() {
            let offset = 68 + idx * 4;
            header[offset..offset + 4].copy_from_slice(&v.to_be_bytes());
        }

        let [r, g, b] = curves;
        let tags = [
            (TagSignature::RED_TRC, r),
            (TagSignature::GREEN_TRC, g),
            (TagSignature::BLUE_TRC, b),
        ]
        .into_iter()
        .map(|(signature, curve)| IccTag {
            signature,
            data: TagData::Curve(curve),
        })
        .collect();

        Self { header, tags }
    }

    /// Creates an RGB display profile with sRGB tone curves.
    pub fn srgb() -> Self {
        let curve = ToneCurve::srgb();
        Self::new_rgb([curve.clone(), curve.clone(), curve])
    }

    #[inline]
    pub fn header(&self) -> &[u8; HEADER_SIZE] {
        &self.header
    }

    /// Profile size recorded in the header of the parsed blob.
    #[inline]
    pub fn declared_size(&self) -> u32 {
        read_u32(&self.header, 0)
    }

    #[inline]
    pub fn color_space(&self) -> [u8; 4] {
        [
            self.header[16],
            self.header[17],
            self.header[18],
            self.header[19],
        ]
    }

    #[inline]
    pub fn is_rgb(&self) -> bool {
        &self.color_space() == b"RGB "
    }

    /// Major and minor version of the profile.
    #[inline]
    pub fn version(&self) -> (u8, u8) {
        (self.header[8], self.header[9] >> 4)
    }

    #[inline]
    pub fn tags(&self) -> &[IccTag] {
        &self.tags
    }

    pub fn tag(&self, signature: TagSignature) -> Option<&IccTag> {
        self.tags.iter().find(|tag| tag.signature == signature)
    }

    /// Replaces the first tag with the signature, or appends a new tag.
    pub fn set_tag(&mut self, signature: TagSignature, data: TagData) {
        match self.tags.iter_mut().find(|tag| tag.signature == signature) {
            Some(tag) => tag.data = data,
            None => self.tags.push(IccTag { signature, data }),
        }
    }

    /// Removes the first tag with the signature.
    pub fn remove_tag(&mut self, signature: TagSignature) -> Option<TagData> {
        let idx = self.tags.iter().position(|tag| tag.signature == signature)?;
        Some(self.tags.remove(idx).data)
    }

    /// Returns the tone curve stored in the tag.
    pub fn curve(&self, signature: TagSignature) -> Result<&ToneCurve> {
        match self.tag(signature) {
            Some(IccTag {
                data: TagData::Curve(curve),
                ..
            }) => Ok(curve),
            _ => Err(Error::MissingCurve(signature)),
        }
    }

    /// Returns the `rTRC`, `gTRC` and `bTRC` curves.
    pub fn rgb_curves(&self) -> Result<[&ToneCurve; 3]> {
        Ok([
            self.curve(TagSignature::RED_TRC)?,
            self.curve(TagSignature::GREEN_TRC)?,
            self.curve(TagSignature::BLUE_TRC)?,
        ])
    }
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ParametricCurve, ParametricFunction};

    fn sample_profile() -> IccProfile {
        let mut profile = IccProfile::new_rgb([
            ToneCurve::sampled(vec![0, 1000, 30000, 65535]).unwrap(),
            ToneCurve::gamma(2.2).unwrap(),
            ToneCurve::Parametric(
                ParametricCurve::from_params(
                    ParametricFunction::General,
                    &[2.2, 0.9, 0.1, 0.08, 0.04, 0.0, 0.0],
                )
                .unwrap(),
            ),
        ]);
        profile.set_tag(TagSignature(*b"desc"), TagData::Raw(b"desc\0\0\0\0hi!".to_vec()));
        let mut wtpt = b"XYZ \0\0\0\0".to_vec();
        for v in [0xf6d6i32, 0x10000, 0xd32d] {
            wtpt.extend_from_slice(&v.to_be_bytes());
        }
        profile.set_tag(TagSignature(*b"wtpt"), TagData::Raw(wtpt));
        profile
    }

    #[test]
    fn round_trip() {
        let profile = sample_profile();
        let encoded = profile.encode();
        let decoded = IccProfile::parse(&encoded).unwrap();
        assert_eq!(decoded, profile);
        assert_eq!(decoded.declared_size() as usize, encoded.len());
        assert_eq!(decoded.tags().len(), 5);

        // Re-encoding is byte-exact.
        assert_eq!(decoded.encode(), encoded);
    }

    #[test]
    fn encoded_layout() {
        let encoded = sample_profile().encode();
        assert_eq!(encoded.len() % 4, 0);
        assert_eq!(&encoded[36..40], b"acsp");
        assert_eq!(read_u32(&encoded, 0) as usize, encoded.len());
        assert!(encoded[PROFILE_ID].iter().all(|&b| b == 0));
        assert_eq!(read_u32(&encoded, 128), 5);
        for idx in 0..5 {
            let offset = read_u32(&encoded, 132 + idx * 12 + 4);
            assert_eq!(offset % 4, 0);
        }
    }

    #[test]
    fn profile_id_and_size_ignored() {
        let profile = sample_profile();
        let mut encoded = profile.encode();
        encoded[84..100].fill(0xaa);
        encoded.extend_from_slice(&[0; 8]);
        let len = encoded.len() as u32;
        encoded[0..4].copy_from_slice(&len.to_be_bytes());
        let decoded = IccProfile::parse(&encoded).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn curves() {
        let profile = IccProfile::srgb();
        assert!(profile.is_rgb());
        assert_eq!(profile.version(), (4, 3));
        let curves = profile.rgb_curves().unwrap();
        assert!(curves.iter().all(|curve| curve.is_srgb()));

        let mut profile = profile;
        assert!(profile.remove_tag(TagSignature::GREEN_TRC).is_some());
        assert!(matches!(
            profile.rgb_curves(),
            Err(Error::MissingCurve(TagSignature::GREEN_TRC))
        ));

        profile.set_tag(TagSignature::GREEN_TRC, TagData::Raw(b"XYZ \0\0\0\0".to_vec()));
        assert!(matches!(
            profile.curve(TagSignature::GREEN_TRC),
            Err(Error::MissingCurve(_))
        ));
    }

    #[test]
    fn signature_display() {
        assert_eq!(TagSignature::RED_TRC.to_string(), "rTRC");
        assert_eq!(TagSignature([b'a', 0, b'b', 0xff]).to_string(), "a\\x00b\\xff");
    }
}
