//! Connect target selection, IPv4 resolution and dialing.
//!
//! Resolution and dialing sit behind the [`HostResolver`] and [`Dialer`]
//! traits so a session can run against in-memory streams in tests.

use crate::error::FetchError;
use crate::proxy::ProxyDescriptor;
use crate::url_model::TargetUrl;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream, ToSocketAddrs};

/// Port used for direct connections to the origin.
pub const HTTP_PORT: u16 = 80;

/// The host and port actually dialed: the proxy when enabled, else the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    pub host: String,
    pub port: u16,
}

impl ConnectTarget {
    pub fn select(url: &TargetUrl, proxy: &ProxyDescriptor) -> Self {
        match proxy {
            ProxyDescriptor::Enabled { host, port } => Self {
                host: host.clone(),
                port: *port,
            },
            ProxyDescriptor::Disabled => Self {
                host: url.host.clone(),
                port: HTTP_PORT,
            },
        }
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Name lookup used when the host is not a dotted-quad literal.
pub trait HostResolver {
    fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;
}

/// The OS resolver (`getaddrinfo` through `ToSocketAddrs`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn lookup(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok((host, port).to_socket_addrs()?.collect())
    }
}

/// Resolves `host` to an IPv4 socket address.
///
/// A literal dotted quad is used as-is. Otherwise the first IPv4 address
/// returned by `resolver` wins; IPv6 results are skipped.
pub fn resolve_ipv4<R: HostResolver + ?Sized>(
    resolver: &R,
    host: &str,
    port: u16,
) -> Result<SocketAddrV4, FetchError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(SocketAddrV4::new(ip, port));
    }
    tracing::debug!("{} is not an IPv4 literal; looking it up", host);
    let addrs = resolver
        .lookup(host, port)
        .map_err(|e| FetchError::Resolution {
            host: host.to_string(),
            source: Some(e),
        })?;
    addrs
        .into_iter()
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(v4),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| FetchError::Resolution {
            host: host.to_string(),
            source: None,
        })
}

/// Opens a stream to an already resolved address.
pub trait Dialer {
    type Stream: Read + Write + Shutdownable;

    fn dial(&self, addr: SocketAddrV4) -> Result<Self::Stream, FetchError>;
}

/// Blocking TCP dialer. No timeout is configured; the OS connect timeout applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&self, addr: SocketAddrV4) -> Result<TcpStream, FetchError> {
        TcpStream::connect(addr).map_err(|e| classify_dial_error(addr, e))
    }
}

/// `TcpStream::connect` creates and connects the socket in one call. Errors
/// only `socket(2)` can produce are reported as socket errors.
fn classify_dial_error(addr: SocketAddrV4, e: io::Error) -> FetchError {
    if is_socket_creation_error(&e) {
        FetchError::Socket(e)
    } else {
        FetchError::Connect {
            target: addr.to_string(),
            source: e,
        }
    }
}

#[cfg(unix)]
fn is_socket_creation_error(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(
            libc::EMFILE
                | libc::ENFILE
                | libc::ENOBUFS
                | libc::ENOMEM
                | libc::EAFNOSUPPORT
                | libc::EPROTONOSUPPORT
        )
    )
}

#[cfg(not(unix))]
fn is_socket_creation_error(_e: &io::Error) -> bool {
    false
}

/// Lets [`Connection`] shut a stream down before it is dropped.
pub trait Shutdownable {
    fn shutdown_stream(&self) -> io::Result<()>;
}

impl Shutdownable for TcpStream {
    fn shutdown_stream(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Scoped owner of the dialed stream.
///
/// The stream is shut down and released exactly once: by [`Connection::close`]
/// on success or by `Drop` on any early return.
pub struct Connection<S: Shutdownable> {
    stream: S,
    peer: String,
    released: bool,
}

impl<S: Shutdownable> Connection<S> {
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            released: false,
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Explicit release on the success path.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.stream.shutdown_stream() {
            // Peer may already have closed; the descriptor is freed on drop regardless.
            tracing::debug!("shutdown of {} failed: {}", self.peer, e);
        }
        tracing::debug!("released connection to {}", self.peer);
    }
}

impl<S: Shutdownable> Drop for Connection<S> {
    fn drop(&mut self) {
        self.release();
    }
}
