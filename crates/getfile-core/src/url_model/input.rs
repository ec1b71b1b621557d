//! Reading the URL token from an interactive or piped input.

use crate::error::FetchError;
use std::io::BufRead;

/// Reads the first whitespace-delimited token, skipping blank lines.
///
/// The token is cut to at most `max_len` bytes on a UTF-8 boundary. EOF
/// before any token, or a read error, is [`FetchError::Input`].
pub fn read_url_token<R: BufRead>(reader: &mut R, max_len: usize) -> Result<String, FetchError> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).map_err(|e| {
            tracing::debug!("reading URL failed: {}", e);
            FetchError::Input
        })?;
        if n == 0 {
            return Err(FetchError::Input);
        }
        if let Some(token) = first_token(&line, max_len) {
            return Ok(token.to_string());
        }
    }
}

/// First whitespace-delimited token of `s`, cut to at most `max_len` bytes.
///
/// Applied to every URL source so no whitespace, CR or LF reaches the
/// request line.
pub fn first_token(s: &str, max_len: usize) -> Option<&str> {
    s.split_whitespace()
        .next()
        .map(|token| truncate_on_char_boundary(token, max_len))
        .filter(|token| !token.is_empty())
}

fn truncate_on_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
