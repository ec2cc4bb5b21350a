use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum CartographError {
    IoError(std::io::Error),
    /// Tag tree could not be parsed from a chunk payload.
    NbtError(String),
    MissingTag(String),
    UnexpectedTag {
        key: String,
        expected: &'static str,
    },
    /// `None` when the chunk carries no DataVersion at all.
    UnsupportedDataVersion(Option<i32>),
    PackedLengthMismatch {
        expected: usize,
        actual: usize,
    },
    InvalidRegionFile(String),
    UnsupportedCompression(u8),
    /// A color or biome table was loaded without its `default` line.
    MissingDefault(String),
    ConfigError(String),
    RenderError(String),
}

impl CartographError {
    /// Errors that abort the operation which triggered them instead of
    /// being counted and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CartographError::MissingDefault(_) | CartographError::ConfigError(_)
        )
    }
}

impl fmt::Display for CartographError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartographError::IoError(err) => write!(f, "IO error: {}", err),
            CartographError::NbtError(msg) => write!(f, "NBT error: {}", msg),
            CartographError::MissingTag(key) => write!(f, "Missing tag: {}", key),
            CartographError::UnexpectedTag { key, expected } => {
                write!(f, "Unexpected tag shape for {}: expected {}", key, expected)
            }
            CartographError::UnsupportedDataVersion(Some(version)) => {
                write!(f, "Unsupported data version: {}", version)
            }
            CartographError::UnsupportedDataVersion(None) => {
                write!(f, "Unsupported data version: chunk has no DataVersion")
            }
            CartographError::PackedLengthMismatch { expected, actual } => write!(
                f,
                "Packed index array has {} words, expected {}",
                actual, expected
            ),
            CartographError::InvalidRegionFile(msg) => write!(f, "Invalid region file: {}", msg),
            CartographError::UnsupportedCompression(scheme) => {
                write!(f, "Unsupported chunk compression scheme: {}", scheme)
            }
            CartographError::MissingDefault(table) => {
                write!(f, "Missing default entry in {}", table)
            }
            CartographError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            CartographError::RenderError(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl Error for CartographError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CartographError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CartographError {
    fn from(err: std::io::Error) -> Self {
        CartographError::IoError(err)
    }
}
