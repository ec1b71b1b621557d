//! HTTP/1.1 GET request construction.

use crate::error::FetchError;
use crate::proxy::ProxyDescriptor;
use crate::url_model::TargetUrl;

/// Default cap on the composed request.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 4096;

/// Which request-target form to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Absolute-URL request-target, for when the TCP peer is a proxy.
    Proxy,
    /// Origin-relative request-target.
    Direct,
}

impl From<&ProxyDescriptor> for RequestMode {
    fn from(proxy: &ProxyDescriptor) -> Self {
        if proxy.is_enabled() {
            RequestMode::Proxy
        } else {
            RequestMode::Direct
        }
    }
}

/// Builds the full request, headers and blank line included.
///
/// `Connection: close` is always sent so end-of-stream marks the end of the
/// response. A request longer than `max_bytes` is rejected, never truncated.
pub fn build_request(
    url: &TargetUrl,
    mode: RequestMode,
    max_bytes: usize,
) -> Result<String, FetchError> {
    let request = match mode {
        RequestMode::Proxy => format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            url.origin_url(),
            url.host
        ),
        RequestMode::Direct => format!(
            "GET /{} HTTP/1.1\r\nHost: {}:80\r\nConnection: close\r\n\r\n",
            url.path, url.host
        ),
    };
    if request.len() > max_bytes {
        return Err(FetchError::RequestTooLarge {
            size: request.len(),
            limit: max_bytes,
        });
    }
    Ok(request)
}
