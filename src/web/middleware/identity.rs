//! Client identity extraction for rate limiting.

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Identity used when no address information is available.
///
/// All such callers share one rate-limit bucket: fail-safe, not fail-open.
pub const SHARED_IDENTITY: &str = "unknown";

/// Extract a best-effort client identity from request metadata.
///
/// Checks the `X-Forwarded-For` chain first (first hop), then `X-Real-IP`,
/// then the connection address. Falls back to [`SHARED_IDENTITY`] when none
/// is present, so identity-less callers are still rate-limited, coarsely.
pub fn client_identity(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    if let Some(ConnectInfo(addr)) = connect_info {
        return addr.ip().to_string();
    }

    SHARED_IDENTITY.to_string()
}
