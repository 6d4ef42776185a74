//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed route table, one connection per request (`Connection: close`).
//! Unknown paths get 404. Routes can omit `Content-Length`, cut the body short,
//! stall, return an arbitrary status or redirect.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long stalling routes hold the connection; well past any test timeout.
const STALL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with `Content-Length`.
    Body(Vec<u8>),
    /// 200 without `Content-Length`; the body ends when the connection closes.
    Unsized(Vec<u8>),
    /// 200 declaring `declared` bytes but sending only `body` before closing.
    Truncated { body: Vec<u8>, declared: u64 },
    /// Reads the request and never answers; the connection stays open.
    Stall,
    /// Sends the head declaring `declared` bytes and `body`, then goes silent
    /// without closing the connection.
    StallMidBody { body: Vec<u8>, declared: u64 },
    /// Bare status line with a short text body.
    Status(u16),
    /// 302 to another path on this server.
    Redirect(String),
}

/// Starts a server in a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// `n` bytes of a repeating, non-trivial pattern.
pub fn body_of(n: usize) -> Vec<u8> {
    (0u8..251).cycle().take(n).collect()
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };
    match routes.get(&path) {
        Some(Route::Body(body)) => {
            write_head(&mut stream, "200 OK", Some(body.len() as u64), &[]);
            let _ = stream.write_all(body);
        }
        Some(Route::Unsized(body)) => {
            write_head(&mut stream, "200 OK", None, &[]);
            let _ = stream.write_all(body);
        }
        Some(Route::Truncated { body, declared }) => {
            write_head(&mut stream, "200 OK", Some(*declared), &[]);
            let _ = stream.write_all(body);
            let _ = stream.flush();
        }
        Some(Route::Stall) => {
            thread::sleep(STALL);
        }
        Some(Route::StallMidBody { body, declared }) => {
            write_head(&mut stream, "200 OK", Some(*declared), &[]);
            let _ = stream.write_all(body);
            let _ = stream.flush();
            thread::sleep(STALL);
        }
        Some(Route::Status(code)) => {
            let text = format!("status {code}\n");
            write_head(
                &mut stream,
                &format!("{code} {}", reason(*code)),
                Some(text.len() as u64),
                &[],
            );
            let _ = stream.write_all(text.as_bytes());
        }
        Some(Route::Redirect(to)) => {
            write_head(
                &mut stream,
                "302 Found",
                Some(0),
                &[("Location", to.as_str())],
            );
        }
        None => {
            let text = b"not found\n";
            write_head(&mut stream, "404 Not Found", Some(text.len() as u64), &[]);
            let _ = stream.write_all(text);
        }
    }
    let _ = stream.shutdown(std::net::Shutdown::Write);
}

fn write_head(stream: &mut TcpStream, status: &str, len: Option<u64>, extra: &[(&str, &str)]) {
    let mut head = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
    if let Some(len) = len {
        head.push_str(&format!("Content-Length: {len}\r\n"));
    }
    for (name, value) in extra {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
}

/// Reads up to the end of the request head; returns the path without query.
fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > 64 * 1024 {
            return None;
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    Some(target.split('?').next().unwrap_or(target).to_string())
}

fn reason(code: u16) -> &'static str {
    match code {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
