//! Collects curl header callback lines into the head of the final response.

/// Status and size of the response whose body is being delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// HTTP status code of the final response (0 if no status line was seen).
    pub status: u32,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Accumulates header lines. With redirects followed, curl reports one header block
/// per hop; each status line starts a new block so only the last response survives.
#[derive(Debug, Default)]
pub(crate) struct HeadCollector {
    head: ResponseHead,
}

impl HeadCollector {
    pub(crate) fn push_line(&mut self, raw: &[u8]) {
        let Ok(line) = std::str::from_utf8(raw) else {
            return;
        };
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if let Some(status) = parse_status_line(line) {
            self.head = ResponseHead {
                status,
                ..ResponseHead::default()
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                self.head.content_length = value.parse::<u64>().ok();
            }
            if name.eq_ignore_ascii_case("content-type") {
                self.head.content_type = Some(value.to_string());
            }
        }
    }

    pub(crate) fn head(&self) -> &ResponseHead {
        &self.head
    }
}

/// `HTTP/1.1 200 OK` or `HTTP/2 404` -> status code.
fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let proto = parts.next()?;
    if !proto.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse::<u32>().ok()
}
