// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Network(String),
    InvalidOption(String),
}

/// Reasons an image load cycle can fail.
///
/// This is the payload of the component's `error` event. Every variant is
/// terminal for the current load cycle: there is no retry, the host decides
/// what to do (usually by changing the source).
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The file or remote resource does not exist.
    NotFound(String),

    /// The remote server answered with a non-success status.
    HttpStatus(u16),

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    Network(String),

    /// The URL uses a scheme the loader does not understand.
    UnsupportedScheme(String),

    /// The bytes could not be decoded as an image.
    Decode(String),

    /// The resource exceeds the configured maximum size.
    TooLarge { limit_bytes: u64 },

    /// Local I/O error other than "not found".
    Io(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(what) => write!(f, "Image not found: {}", what),
            LoadError::HttpStatus(code) => write!(f, "Server answered with status {}", code),
            LoadError::Network(msg) => write!(f, "Network error: {}", msg),
            LoadError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported URL scheme: {}", scheme)
            }
            LoadError::Decode(msg) => write!(f, "Decoding failed: {}", msg),
            LoadError::TooLarge { limit_bytes } => {
                write!(f, "Image exceeds the {} byte limit", limit_bytes)
            }
            LoadError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl From<image_rs::ImageError> for LoadError {
    fn from(err: image_rs::ImageError) -> Self {
        match err {
            image_rs::ImageError::IoError(io) => LoadError::from(io),
            other => LoadError::Decode(other.to_string()),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(err.to_string()),
            _ => LoadError::Io(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LoadError::HttpStatus(status.as_u16()),
            None => LoadError::Network(err.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Network(e) => write!(f, "Network Error: {}", e),
            Error::InvalidOption(e) => write!(f, "Invalid Option: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn invalid_option_formats_properly() {
        let err = Error::InvalidOption("fit: stretch".into());
        assert_eq!(format!("{}", err), "Invalid Option: fit: stretch");
    }

    #[test]
    fn load_error_from_missing_file_is_not_found() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(LoadError::from(io_error), LoadError::NotFound(_)));
    }

    #[test]
    fn load_error_from_permission_denied_is_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(LoadError::from(io_error), LoadError::Io(_)));
    }

    #[test]
    fn load_error_display_includes_status() {
        assert!(format!("{}", LoadError::HttpStatus(503)).contains("503"));
    }
}
