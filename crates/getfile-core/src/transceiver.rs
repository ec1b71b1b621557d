//! Sending the request and streaming the raw response.

use crate::error::FetchError;
use std::io::{self, Read, Write};

/// Default receive buffer size.
pub const DEFAULT_RECV_BUFFER_BYTES: usize = 4096;

/// Writes `request` with a single `write` call.
///
/// Fewer bytes accepted than requested is a send error, as is any I/O error.
pub fn send_request<W: Write + ?Sized>(stream: &mut W, request: &[u8]) -> Result<usize, FetchError> {
    let sent = stream.write(request).map_err(|e| FetchError::Send {
        sent: 0,
        expected: request.len(),
        source: Some(e),
    })?;
    if sent < request.len() {
        return Err(FetchError::Send {
            sent,
            expected: request.len(),
            source: None,
        });
    }
    tracing::debug!("sent {} request bytes", sent);
    Ok(sent)
}

/// Copies everything read from `stream` to `out` until a zero-byte read.
///
/// Bytes are written verbatim, headers included. Returns the number of bytes
/// received. Interrupted reads are retried.
pub fn receive_response<R, W>(
    stream: &mut R,
    out: &mut W,
    buffer_size: usize,
) -> Result<u64, FetchError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total: u64 = 0;
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FetchError::Recv(e)),
        };
        out.write_all(&buf[..n]).map_err(FetchError::Output)?;
        total += n as u64;
    }
    out.flush().map_err(FetchError::Output)?;
    tracing::debug!("end of stream after {} bytes", total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out the given chunks one read at a time, then fails or ends.
    struct ScriptedReader {
        chunks: Vec<io::Result<Vec<u8>>>,
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            match self.chunks.remove(0) {
                Ok(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Err(e) => Err(e),
            }
        }
    }

    struct ShortWriter(usize);

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len().min(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(32))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn full_write_succeeds() {
        let mut sink = Vec::new();
        let n = send_request(&mut sink, b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(n, 18);
        assert_eq!(sink, b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn short_write_is_send_error() {
        let err = send_request(&mut ShortWriter(4), b"GET / HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(
            err,
            FetchError::Send {
                sent: 4,
                expected: 18,
                source: None
            }
        ));
    }

    #[test]
    fn write_error_keeps_os_code() {
        let err = send_request(&mut FailingWriter, b"x").unwrap_err();
        assert_eq!(err.code(), 32);
    }

    #[test]
    fn response_is_copied_verbatim() {
        let mut stream = Cursor::new(b"HTTP/1.1 200 OK\r\n\r\nhello".to_vec());
        let mut out = Vec::new();
        let n = receive_response(&mut stream, &mut out, DEFAULT_RECV_BUFFER_BYTES).unwrap();
        assert_eq!(n, 24);
        assert_eq!(out, b"HTTP/1.1 200 OK\r\n\r\nhello");
    }

    #[test]
    fn chunks_smaller_than_response_are_concatenated() {
        let body: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        let mut stream = Cursor::new(body.clone());
        let mut out = Vec::new();
        receive_response(&mut stream, &mut out, 7).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn read_error_is_recv_error_and_stops_output() {
        let mut stream = ScriptedReader {
            chunks: vec![
                Ok(b"HTTP/1.1 200 OK\r\n".to_vec()),
                Err(io::Error::from_raw_os_error(104)),
                Ok(b"never printed".to_vec()),
            ],
        };
        let mut out = Vec::new();
        let err = receive_response(&mut stream, &mut out, 64).unwrap_err();
        assert!(matches!(err, FetchError::Recv(_)));
        assert_eq!(err.exit_code(), 104);
        assert_eq!(out, b"HTTP/1.1 200 OK\r\n");
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut stream = ScriptedReader {
            chunks: vec![
                Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
                Ok(b"ok".to_vec()),
            ],
        };
        let mut out = Vec::new();
        assert_eq!(receive_response(&mut stream, &mut out, 64).unwrap(), 2);
        assert_eq!(out, b"ok");
    }

    #[test]
    fn output_failure_is_output_error() {
        let mut stream = Cursor::new(b"data".to_vec());
        let err = receive_response(&mut stream, &mut FailingWriter, 64).unwrap_err();
        assert!(matches!(err, FetchError::Output(_)));
    }
}
