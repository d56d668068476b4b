/// Error types shared by the rendering pipeline and its drivers

use std::fmt;

/// Reasons a mesh file is rejected by the STL loader
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Fewer bytes than the 80-byte header plus the triangle count
    TooShort { len: usize },
    /// The declared triangle count disagrees with the file size
    CountMismatch {
        declared: u32,
        expected_len: u64,
        actual_len: usize,
    },
    /// A vertex component decoded to NaN or infinity
    NonFinite { facet: usize },
    /// ASCII STL that could not be parsed
    Ascii(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::TooShort { len } => {
                write!(f, "file too small to be a valid STL ({} bytes)", len)
            }
            FormatError::CountMismatch {
                declared,
                expected_len,
                actual_len,
            } => write!(
                f,
                "header declares {} triangles ({} bytes) but file has {} bytes",
                declared, expected_len, actual_len
            ),
            FormatError::NonFinite { facet } => {
                write!(f, "facet {} has a non-finite vertex component", facet)
            }
            FormatError::Ascii(msg) => write!(f, "failed to parse ASCII STL: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

/// Top-level error for the ledcube pipeline
#[derive(Debug)]
pub enum Error {
    Format(FormatError),
    Hardware(String),
    Config(String),
    Io(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ron::error::SpannedError> for Error {
    fn from(e: ron::error::SpannedError) -> Self {
        Error::Config(e.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(e) => write!(f, "format error: {}", e),
            Error::Hardware(msg) => write!(f, "hardware error: {}", msg),
            Error::Config(msg) => write!(f, "config error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Format(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
