//! HTTP GET via libcurl: buffered text for page scraping, streaming for downloads.
//!
//! Both modes run in the current thread and block until the transfer ends. The
//! timeout bounds connecting and every stall in the body (no bytes for `timeout`
//! aborts), not the total transfer time, so large assets are not cut off.

mod classify;
mod head;
mod saved;

pub use classify::classify_curl_error;
pub use head::ResponseHead;
pub use saved::SavedPage;

use crate::error::GrabError;
use head::HeadCollector;
use std::cell::RefCell;
use std::time::Duration;
use url::Url;

/// Smallest and largest chunk size accepted by libcurl's receive buffer.
pub const MIN_CHUNK_SIZE: usize = 1024;
pub const MAX_CHUNK_SIZE: usize = 512 * 1024;

/// Transfer settings shared by page fetches and downloads.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Receive buffer size; each streamed chunk is at most this many bytes.
    pub chunk_size: usize,
    pub max_redirects: u32,
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
            chunk_size: 8192,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

/// Receives a streamed response body. `begin` is called exactly once, only for a
/// 2xx response, before the first `chunk`.
pub trait StreamSink {
    fn begin(&mut self, head: &ResponseHead) -> Result<(), GrabError>;
    fn chunk(&mut self, data: &[u8]) -> Result<(), GrabError>;
}

/// Anything that can supply the text of a page for asset discovery.
pub trait PageSource {
    fn fetch_page(&self, url: &Url) -> Result<String, GrabError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    options: FetchOptions,
}

struct StreamState {
    headers: HeadCollector,
    begun: bool,
    rejected: Option<u32>,
    sink_error: Option<GrabError>,
    received: u64,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// GET `url` and return the body as text (invalid UTF-8 is replaced).
    pub fn fetch_text(&self, url: &Url) -> Result<String, GrabError> {
        let mut sink = BufferSink::default();
        self.stream(url, &mut sink)?;
        Ok(String::from_utf8_lossy(&sink.body).into_owned())
    }

    /// GET `url`, handing each received chunk to `sink`. Returns the body length.
    ///
    /// Non-2xx responses never reach the sink. Once `begin` has succeeded, any
    /// curl failure is reported as `Transfer` with the bytes accepted so far.
    pub fn stream(&self, url: &Url, sink: &mut dyn StreamSink) -> Result<u64, GrabError> {
        let url_str = url.as_str();
        let mut easy = self.easy(url_str)?;
        let state = RefCell::new(StreamState {
            headers: HeadCollector::default(),
            begun: false,
            rejected: None,
            sink_error: None,
            received: 0,
        });

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|line| {
                    state.borrow_mut().headers.push_line(line);
                    true
                })
                .map_err(|e| network(url_str, e))?;
            transfer
                .write_function(|data| {
                    let mut st = state.borrow_mut();
                    if !st.begun {
                        let head = st.headers.head().clone();
                        if !head.is_success() {
                            st.rejected = Some(head.status);
                            return Ok(0); // abort transfer
                        }
                        if let Err(e) = sink.begin(&head) {
                            st.sink_error = Some(e);
                            return Ok(0);
                        }
                        st.begun = true;
                    }
                    match sink.chunk(data) {
                        Ok(()) => {
                            st.received += data.len() as u64;
                            Ok(data.len())
                        }
                        Err(e) => {
                            st.sink_error = Some(e);
                            Ok(0)
                        }
                    }
                })
                .map_err(|e| network(url_str, e))?;
            transfer.perform()
        };

        let st = state.into_inner();
        let head = st.headers.head().clone();
        if let Some(status) = st.rejected {
            return Err(GrabError::HttpStatus {
                url: url_str.to_string(),
                status,
            });
        }
        if let Some(e) = st.sink_error {
            return Err(e);
        }
        if let Err(e) = performed {
            if st.begun {
                return Err(GrabError::Transfer {
                    url: url_str.to_string(),
                    received: st.received,
                    expected: head.content_length,
                    reason: e.to_string(),
                });
            }
            return Err(network(url_str, e));
        }

        let status = easy.response_code().map_err(|e| network(url_str, e))?;
        if !(200..300).contains(&status) {
            return Err(GrabError::HttpStatus {
                url: url_str.to_string(),
                status,
            });
        }
        if !st.begun {
            // Empty body: the write callback never fired.
            sink.begin(&head)?;
        }
        if let Some(total) = head.content_length {
            if st.received < total {
                return Err(GrabError::Transfer {
                    url: url_str.to_string(),
                    received: st.received,
                    expected: Some(total),
                    reason: "connection closed before the declared length".to_string(),
                });
            }
        }
        tracing::trace!(url = url_str, bytes = st.received, status, "GET complete");
        Ok(st.received)
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, GrabError> {
        let opts = &self.options;
        let mut easy = curl::easy::Easy::new();
        let setup = |r: Result<(), curl::Error>| r.map_err(|e| network(url, e));
        setup(easy.url(url))?;
        setup(easy.get(true))?;
        setup(easy.follow_location(true))?;
        setup(easy.max_redirections(opts.max_redirects))?;
        setup(easy.connect_timeout(opts.connect_timeout))?;
        // Abort when the transfer stalls (less than 1 byte/s) for `timeout`.
        setup(easy.low_speed_limit(1))?;
        setup(easy.low_speed_time(opts.timeout))?;
        setup(
            easy.buffer_size(opts.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)),
        )?;
        if let Some(ua) = &opts.user_agent {
            setup(easy.useragent(ua))?;
        }
        Ok(easy)
    }
}

impl PageSource for HttpFetcher {
    fn fetch_page(&self, url: &Url) -> Result<String, GrabError> {
        self.fetch_text(url)
    }
}

fn network(url: &str, source: curl::Error) -> GrabError {
    GrabError::Network {
        url: url.to_string(),
        kind: classify_curl_error(&source),
        source,
    }
}

/// Collects a (small) body in memory; used for page text only.
#[derive(Default)]
struct BufferSink {
    body: Vec<u8>,
}

impl StreamSink for BufferSink {
    fn begin(&mut self, head: &ResponseHead) -> Result<(), GrabError> {
        if let Some(len) = head.content_length {
            self.body.reserve(len.min(MAX_CHUNK_SIZE as u64 * 16) as usize);
        }
        Ok(())
    }

    fn chunk(&mut self, data: &[u8]) -> Result<(), GrabError> {
        self.body.extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let o = FetchOptions::default();
        assert_eq!(o.timeout, Duration::from_secs(10));
        assert_eq!(o.chunk_size, 8192);
        assert_eq!(o.max_redirects, 10);
        assert!(o.user_agent.is_none());
    }

    #[test]
    fn unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is almost never listening.
        let fetcher = HttpFetcher::new(FetchOptions {
            connect_timeout: Duration::from_secs(2),
            ..FetchOptions::default()
        });
        let url = Url::parse("http://127.0.0.1:9/index.html").unwrap();
        let err = fetcher.fetch_text(&url).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Network);
    }

    #[test]
    fn buffer_sink_collects_chunks() {
        let mut sink = BufferSink::default();
        sink.begin(&ResponseHead {
            status: 200,
            content_length: Some(6),
            content_type: None,
        })
        .unwrap();
        sink.chunk(b"abc").unwrap();
        sink.chunk(b"def").unwrap();
        assert_eq!(sink.body, b"abcdef");
    }
}
