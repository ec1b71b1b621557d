//! Core of `getfile`: one HTTP/1.1 GET over a plain TCP socket, optionally
//! through an HTTP proxy, with the raw response streamed to a writer.

pub mod config;
pub mod connector;
pub mod error;
pub mod logging;
pub mod platform;
pub mod proxy;
pub mod request;
pub mod session;
pub mod transceiver;
pub mod url_model;

pub use error::{FetchError, FAILURE_CODE};
pub use session::{RunSummary, Session, SessionOptions};
