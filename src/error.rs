#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    Grid(hdr_grid::Error),
    Color(hdr_color::Error),
}

impl From<hdr_grid::Error> for Error {
    fn from(err: hdr_grid::Error) -> Self {
        Self::Grid(err)
    }
}

impl From<hdr_color::Error> for Error {
    fn from(err: hdr_color::Error) -> Self {
        Self::Color(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid(err) => write!(f, "{err}"),
            Self::Color(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            Self::Color(err) => Some(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
