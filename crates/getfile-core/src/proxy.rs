//! Proxy discovery from the `http_proxy` environment variable.
//!
//! Malformed values never fail the run: they disable proxying and the
//! request goes to the origin directly.

use crate::url_model::HTTP_SCHEME;
use std::fmt;

/// Default environment variable holding the proxy URL.
pub const DEFAULT_PROXY_ENV: &str = "http_proxy";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProxyDescriptor {
    #[default]
    Disabled,
    Enabled { host: String, port: u16 },
}

impl ProxyDescriptor {
    /// Applies the `http://host:port` rule to an optional raw value.
    ///
    /// The port is read from the text after the first `:` following the
    /// scheme, with C `atoi` leniency (leading blanks, a `+`, trailing
    /// junk such as `/`). It must be in `1..=65535`. A missing scheme, colon, port or host disables the proxy.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(rest) = value.and_then(|v| v.strip_prefix(HTTP_SCHEME)) else {
            return ProxyDescriptor::Disabled;
        };
        let Some((host, after_colon)) = rest.split_once(':') else {
            return ProxyDescriptor::Disabled;
        };
        if host.is_empty() {
            return ProxyDescriptor::Disabled;
        }
        match leading_port(after_colon) {
            Some(port) => ProxyDescriptor::Enabled {
                host: host.to_string(),
                port,
            },
            None => ProxyDescriptor::Disabled,
        }
    }

    /// Reads `var_name` from the process environment and parses it.
    pub fn from_env(var_name: &str) -> Self {
        let value = std::env::var(var_name).ok();
        let descriptor = Self::parse(value.as_deref());
        if value.is_some() && !descriptor.is_enabled() {
            tracing::warn!("ignoring malformed {}={:?}", var_name, value);
        }
        descriptor
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ProxyDescriptor::Enabled { .. })
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyDescriptor::Disabled => write!(f, "direct"),
            ProxyDescriptor::Enabled { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

/// Port from the start of `s`, read the way C `atoi` reads it: leading
/// whitespace and one `+` are skipped, then decimal digits up to the first
/// non-digit.
fn leading_port(s: &str) -> Option<u16> {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let s = s.strip_prefix('+').unwrap_or(s);
    let digits_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    match s[..digits_end].parse::<u16>() {
        Ok(port) if port > 0 => Some(port),
        _ => None,
    }
}
