//! Classify curl errors into network failure kinds.

use crate::error::NetworkKind;

/// Classify a curl error raised before any response body was accepted.
pub fn classify_curl_error(e: &curl::Error) -> NetworkKind {
    if e.is_operation_timedout() {
        return NetworkKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return NetworkKind::Dns;
    }
    if e.is_couldnt_connect()
        || e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return NetworkKind::Connect;
    }
    NetworkKind::Other
}
