//! Error taxonomy for a single fetch.
//!
//! Every variant is fatal at the point of detection. The binary prints the
//! message with [`FetchError::code`] and exits with [`FetchError::exit_code`].

use std::io;
use thiserror::Error;

/// Code reported when no positive OS error code is available
/// (bad input, short writes, lookups that carry no errno).
pub const FAILURE_CODE: i32 = -1;

#[derive(Debug, Error)]
pub enum FetchError {
    /// No URL could be read from the input.
    #[error("Failed to read URL")]
    Input,

    /// DNS lookup failed or produced no IPv4 address.
    #[error("Cannot resolve {host}")]
    Resolution {
        host: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The OS refused to create the socket.
    #[error("Cannot create socket")]
    Socket(#[source] io::Error),

    /// TCP connect to the selected target failed.
    #[error("Cannot connect to {target}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },

    /// The request write failed or was only partially accepted.
    #[error("Cannot send data ({sent} of {expected} bytes accepted)")]
    Send {
        sent: usize,
        expected: usize,
        #[source]
        source: Option<io::Error>,
    },

    /// A read failed before end-of-stream.
    #[error("Error receiving data")]
    Recv(#[source] io::Error),

    /// The composed request exceeds the configured maximum.
    #[error("Request of {size} bytes exceeds the {limit}-byte limit")]
    RequestTooLarge { size: usize, limit: usize },

    /// Writing the transcript or response to the output failed.
    #[error("Cannot write output")]
    Output(#[source] io::Error),
}

impl FetchError {
    /// Underlying OS error, if any.
    pub fn os_error(&self) -> Option<&io::Error> {
        match self {
            FetchError::Resolution { source, .. } | FetchError::Send { source, .. } => {
                source.as_ref()
            }
            FetchError::Socket(e) | FetchError::Recv(e) | FetchError::Output(e) => Some(e),
            FetchError::Connect { source, .. } => Some(source),
            FetchError::Input | FetchError::RequestTooLarge { .. } => None,
        }
    }

    /// Numeric code shown next to the message: the raw OS error code when the
    /// failure came from the OS, else [`FAILURE_CODE`].
    pub fn code(&self) -> i32 {
        self.os_error()
            .and_then(io::Error::raw_os_error)
            .unwrap_or(FAILURE_CODE)
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.code() {
            code if code > 0 => code,
            _ => FAILURE_CODE,
        }
    }
}
