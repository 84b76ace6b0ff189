use crate::icc::TagSignature;

#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    BadHeader(&'static str),
    TruncatedProfile(&'static str),
    BadCurve(&'static str),
    MissingCurve(TagSignature),
    Grid(hdr_grid::Error),
}

impl From<hdr_grid::Error> for Error {
    fn from(err: hdr_grid::Error) -> Self {
        Self::Grid(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Error::*;

        match self {
            BadHeader(s) => write!(f, "malformed ICC header: {s}"),
            TruncatedProfile(s) => write!(f, "truncated ICC profile: {s}"),
            BadCurve(s) => write!(f, "invalid tone curve: {s}"),
            MissingCurve(sig) => write!(f, "tone curve `{sig}` is missing"),
            Grid(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use Error::*;

        match self {
            Grid(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
