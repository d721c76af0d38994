//! Unified error type.

use std::fmt;

/// The error type surfaced by ruta's fallible operations.
///
/// Two failure surfaces exist. Infrastructure failures — binding a port,
/// accepting a connection — are [`Error::Io`]. Request-processing failures —
/// a middleware or handler giving up on a request — are [`Error::Request`]
/// and travel back up the middleware chain to the server, which answers the
/// client with `500`. Ordinary application outcomes (404, 422, etc.) are
/// [`Response`](crate::Response) values, not errors.
#[derive(Debug)]
pub enum Error {
    /// Socket-level failure: bind or accept.
    Io(std::io::Error),
    /// A downstream middleware or handler failed while processing a request.
    Request(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps anything error-like as a request-processing failure.
    ///
    /// ```rust
    /// use ruta::Error;
    ///
    /// let err = Error::request("validation failed");
    /// assert_eq!(err.to_string(), "validation failed");
    /// ```
    pub fn request(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Request(err.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Request(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Request(e) => Some(&**e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
