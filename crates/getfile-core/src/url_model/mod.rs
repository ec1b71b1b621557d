//! URL modeling: reading the user's URL and splitting it into host and path.

mod input;

pub use input::{first_token, read_url_token};

/// Scheme prefix stripped from user input and proxy values.
pub const HTTP_SCHEME: &str = "http://";

/// Host and path of the requested resource.
///
/// `path` never carries the leading `/`; an empty path means the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    pub host: String,
    pub path: String,
}

impl TargetUrl {
    /// Splits `raw` into host and path.
    ///
    /// An optional `http://` prefix is stripped. Everything before the first
    /// `/` is the host, everything after it the path. The host is not
    /// validated here; resolution rejects what it cannot use.
    ///
    /// # Examples
    ///
    /// - `"http://example.com/a/b"` → host `example.com`, path `a/b`
    /// - `"example.com"` → host `example.com`, empty path
    pub fn parse(raw: &str) -> Self {
        let rest = raw.strip_prefix(HTTP_SCHEME).unwrap_or(raw);
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        Self {
            host: host.to_string(),
            path: path.to_string(),
        }
    }

    /// Absolute form `http://{host}/{path}`.
    pub fn origin_url(&self) -> String {
        format!("{}{}/{}", HTTP_SCHEME, self.host, self.path)
    }
}
