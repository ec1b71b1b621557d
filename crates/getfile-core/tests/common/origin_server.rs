//! Minimal HTTP/1.1 server for integration tests.
//!
//! Accepts connections, captures each request head, answers with a fixed
//! response and closes the connection. Stands in for either an origin or a
//! forwarding proxy: the test only inspects what it was sent.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

pub struct OriginServer {
    pub port: u16,
    requests: Receiver<String>,
}

impl OriginServer {
    /// Next captured request head, waiting up to two seconds.
    pub fn next_request(&self) -> Option<String> {
        self.requests.recv_timeout(Duration::from_secs(2)).ok()
    }
}

/// Starts a server in a background thread answering every request with
/// `response`. The server runs until the process exits.
pub fn start(response: Vec<u8>) -> OriginServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let head = handle(stream, &response);
            if tx.send(head).is_err() {
                return;
            }
        }
    });
    OriginServer { port, requests: rx }
}

fn handle(mut stream: TcpStream, response: &[u8]) -> String {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    let _ = stream.write_all(response);
    String::from_utf8_lossy(&head).into_owned()
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().unwrap().port()
}
