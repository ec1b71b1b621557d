//! One complete fetch: read URL, pick target, resolve, connect, send, stream.
//!
//! Every step writes a `[Step N]` line to the transcript writer. The first
//! failing step ends the run with its [`FetchError`]; the connection, if one
//! was opened, is released on the way out.

use crate::config::GetfileConfig;
use crate::connector::{
    resolve_ipv4, ConnectTarget, Connection, Dialer, HostResolver, SystemResolver, TcpDialer,
};
use crate::error::FetchError;
use crate::platform::SocketSubsystem;
use crate::proxy::ProxyDescriptor;
use crate::request::{build_request, RequestMode};
use crate::transceiver::{receive_response, send_request};
use crate::url_model::{first_token, read_url_token, TargetUrl};
use std::io::{BufRead, Write};
use std::net::Ipv4Addr;

macro_rules! say {
    ($out:expr, $($arg:tt)*) => {
        writeln!($out, $($arg)*).map_err(FetchError::Output)?
    };
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub proxy: ProxyDescriptor,
    /// Name of the variable the proxy came from, for the transcript.
    pub proxy_source: String,
    pub max_url_bytes: usize,
    pub max_request_bytes: usize,
    pub recv_buffer_bytes: usize,
}

impl SessionOptions {
    pub fn from_config(cfg: &GetfileConfig, proxy: ProxyDescriptor) -> Self {
        Self {
            proxy,
            proxy_source: cfg.proxy_env_var.clone(),
            max_url_bytes: cfg.max_url_bytes,
            max_request_bytes: cfg.max_request_bytes,
            recv_buffer_bytes: cfg.recv_buffer_bytes,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&GetfileConfig::default(), ProxyDescriptor::Disabled)
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub url: TargetUrl,
    pub target: ConnectTarget,
    pub bytes_received: u64,
}

pub struct Session<R = SystemResolver, D = TcpDialer> {
    options: SessionOptions,
    resolver: R,
    dialer: D,
}

impl Session {
    /// Session over the OS resolver and real TCP sockets.
    pub fn new(options: SessionOptions) -> Self {
        Self::with_transport(options, SystemResolver, TcpDialer)
    }
}

impl<R: HostResolver, D: Dialer> Session<R, D> {
    pub fn with_transport(options: SessionOptions, resolver: R, dialer: D) -> Self {
        Self {
            options,
            resolver,
            dialer,
        }
    }

    /// Runs the fetch.
    ///
    /// With `preset_url` the prompt is skipped and `input` is not read.
    pub fn run<I, O>(
        &self,
        preset_url: Option<&str>,
        input: &mut I,
        out: &mut O,
    ) -> Result<RunSummary, FetchError>
    where
        I: BufRead,
        O: Write,
    {
        let opts = &self.options;

        let _subsystem = SocketSubsystem::startup();
        say!(out, "[Step 1] {}", SocketSubsystem::startup_message());

        say!(out, "[Step 2] Preparing address structure...");

        say!(out, "[Step 3] Asking for URL...");
        let raw_url = match preset_url {
            Some(url) => {
                let token = first_token(url, opts.max_url_bytes).ok_or(FetchError::Input)?;
                say!(out, "URL: {}", token);
                token.to_string()
            }
            None => {
                write!(out, "URL: ").map_err(FetchError::Output)?;
                out.flush().map_err(FetchError::Output)?;
                read_url_token(input, opts.max_url_bytes)?
            }
        };
        say!(out, "[Step 4] Parsing URL...");
        let url = TargetUrl::parse(&raw_url);
        say!(out, "        Parsed Host: {}", url.host);
        say!(out, "        Parsed Site: {}", url.path);
        tracing::info!("fetching host={} path={}", url.host, url.path);

        match &opts.proxy {
            ProxyDescriptor::Enabled { host, port } => {
                say!(out, "[DEBUG] {} detected → {}:{}", opts.proxy_source, host, port);
            }
            ProxyDescriptor::Disabled => {
                say!(
                    out,
                    "[DEBUG] No valid {} found → connecting directly",
                    opts.proxy_source
                );
            }
        }
        let target = ConnectTarget::select(&url, &opts.proxy);

        say!(out, "[Step 5] Resolving '{}' ...", target.host);
        if target.host.parse::<Ipv4Addr>().is_err() {
            say!(
                out,
                "        Not an IPv4 literal; looking up '{}'...",
                target.host
            );
        }
        let addr = resolve_ipv4(&self.resolver, &target.host, target.port)?;
        say!(out, "        Resolved '{}' → {}", target.host, addr);
        tracing::debug!("resolved {} to {}", target, addr);

        say!(out, "[Step 6] Creating socket...");
        say!(out, "[Step 7] Connecting to {} ...", target);
        let stream = self.dialer.dial(addr)?;
        let mut conn = Connection::new(stream, target.to_string());
        say!(out, "        Connected to {}", conn.peer());
        tracing::info!("connected to {} ({})", target, addr);

        say!(out, "[Step 8] Preparing HTTP GET request...");
        let request = build_request(
            &url,
            RequestMode::from(&opts.proxy),
            opts.max_request_bytes,
        )?;
        say!(out, "        >>> Request >>>\n{}", request);
        send_request(conn.stream_mut(), request.as_bytes())?;
        say!(out, "        Request sent successfully.");

        say!(out, "[Step 9] Receiving HTTP response...");
        say!(out, "---- Start of response ----");
        let bytes_received = receive_response(conn.stream_mut(), out, opts.recv_buffer_bytes)?;
        say!(out, "\n---- End of response ----");
        tracing::info!("received {} bytes from {}", bytes_received, target);

        say!(out, "[Step 10] Closing socket and cleaning up.");
        conn.close();
        say!(out, "[Step 10] Done. Exiting.");

        Ok(RunSummary {
            url,
            target,
            bytes_received,
        })
    }
}
