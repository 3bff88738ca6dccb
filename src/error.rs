//! Crate-level error types.

use std::fmt;

/// Errors produced by the morphview crate.
///
/// Frame-path operations never return these; they absorb failures into
/// state (progress flags, `None` lookups). Errors surface only from calls
/// that run outside the frame: options I/O, asset decoding, export and
/// worker-thread spawning.
#[derive(Debug)]
pub enum MorphviewError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// An asset request could not be fetched.
    AssetFetch {
        /// Requested location.
        url: String,
        /// Transport-level reason.
        message: String,
    },
    /// A fetched asset could not be decoded.
    AssetDecode {
        /// Requested location.
        url: String,
        /// Decoder-level reason.
        message: String,
    },
    /// Scene export failure.
    Export(String),
}

impl MorphviewError {
    /// Build an [`AssetDecode`](Self::AssetDecode) error.
    pub(crate) fn decode(url: &str, message: impl Into<String>) -> Self {
        Self::AssetDecode {
            url: url.to_owned(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MorphviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::AssetFetch { url, message } => {
                write!(f, "failed to fetch {url}: {message}")
            }
            Self::AssetDecode { url, message } => {
                write!(f, "failed to decode {url}: {message}")
            }
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for MorphviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MorphviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for MorphviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Export(e.to_string())
    }
}
