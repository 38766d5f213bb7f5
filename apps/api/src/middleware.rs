use std::net::{IpAddr, SocketAddr};

use agora_core::{AppError, CallerContext};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use ipnet::IpNet;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the authenticated forum uid; `0` is a guest.
pub const FORUM_UID_HEADER: &str = "x-forum-uid";

pub async fn require_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let uid = caller_uid(request.headers())?;
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let ip = client_ip(peer, request.headers(), &state.trusted_proxies);

    request.extensions_mut().insert(CallerContext::new(uid, ip));
    Ok(next.run(request).await)
}

fn caller_uid(headers: &HeaderMap) -> Result<u64, AppError> {
    let value = headers
        .get(FORUM_UID_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("{FORUM_UID_HEADER} header is required")))?;

    value
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            AppError::Unauthorized(format!(
                "{FORUM_UID_HEADER} must be a non-negative integer"
            ))
        })
}

/// Resolves the client address. `x-forwarded-for` is honoured only when the
/// direct peer is a trusted proxy.
fn client_ip(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[IpNet],
) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted_proxies.iter().any(|network| network.contains(&peer)) {
        return Some(peer);
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok())
        .or(Some(peer))
}
