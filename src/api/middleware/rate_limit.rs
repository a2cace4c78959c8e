//! IP rate limiting middleware backed by Redis counters.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_LOGIN_REQUESTS, RATE_LIMIT_REGISTER_REQUESTS,
    RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW_SECONDS,
};
use crate::errors::AppError;

/// One named limiter: key prefix, budget and rejection message.
#[derive(Debug, Clone, Copy)]
struct Limit {
    prefix: &'static str,
    max_requests: u64,
    window_seconds: u64,
    message: &'static str,
}

const LOGIN: Limit = Limit {
    prefix: "login",
    max_requests: RATE_LIMIT_LOGIN_REQUESTS,
    window_seconds: RATE_LIMIT_AUTH_WINDOW_SECONDS,
    message: "Terlalu banyak percobaan login. Silakan coba lagi dalam 1 menit.",
};

const REGISTER: Limit = Limit {
    prefix: "register",
    max_requests: RATE_LIMIT_REGISTER_REQUESTS,
    window_seconds: RATE_LIMIT_AUTH_WINDOW_SECONDS,
    message: "Terlalu banyak percobaan registrasi. Silakan coba lagi dalam 1 menit.",
};

const GENERAL: Limit = Limit {
    prefix: "general",
    max_requests: RATE_LIMIT_REQUESTS,
    window_seconds: RATE_LIMIT_WINDOW_SECONDS,
    message: "Terlalu banyak permintaan. Silakan coba lagi nanti.",
};

/// Source address a request is counted against.
///
/// The socket peer is the client unless it is a trusted proxy, in which case
/// the first `X-Forwarded-For` hop (or `X-Real-IP`) names the client.
/// Headers from any other peer are ignored so callers cannot pick their bucket.
fn client_identifier(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let Some(ConnectInfo(peer)) = request.extensions().get::<ConnectInfo<SocketAddr>>() else {
        return "unknown".to_string();
    };
    let peer_ip = peer.ip();

    if !trusted_proxies.contains(&peer_ip) {
        return peer_ip.to_string();
    }

    forwarded_client(request)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| peer_ip.to_string())
}

fn forwarded_client(request: &Request) -> Option<IpAddr> {
    let headers = request.headers();
    headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|forwarded| forwarded.split(',').next())
        .and_then(|hop| hop.trim().parse().ok())
        .or_else(|| {
            headers
                .get("X-Real-IP")
                .and_then(|h| h.to_str().ok())
                .and_then(|ip| ip.trim().parse().ok())
        })
}

async fn enforce(
    limit: Limit,
    state: AppState,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_id = client_identifier(&request, &state.trusted_proxies);
    let key = format!("{}:{}", limit.prefix, client_id);

    let decision = match state
        .rate_limits
        .check_rate_limit(&key, limit.max_requests, limit.window_seconds)
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            // Fail closed: an unreachable counter store must not disable limiting.
            tracing::error!(error = %e, limiter = limit.prefix, "Rate limit check failed - denying request");
            return Err(AppError::RateLimited {
                retry_after: limit.window_seconds,
                message: limit.message.to_string(),
            });
        }
    };

    if !decision.allowed {
        tracing::warn!(
            client = %client_id,
            limiter = limit.prefix,
            count = decision.count,
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimited {
            retry_after: decision.retry_after,
            message: limit.message.to_string(),
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit.max_requests));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));

    Ok(response)
}

/// General limit for authenticated routes.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(GENERAL, state, request, next).await
}

/// Login attempts per IP.
pub async fn rate_limit_login_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(LOGIN, state, request, next).await
}

/// Registrations per IP.
pub async fn rate_limit_register_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(REGISTER, state, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const PROXY: &str = "10.0.0.2";

    fn from_peer(peer: &str, forwarded_for: Option<&str>) -> Request {
        let mut builder = Request::builder();
        if let Some(value) = forwarded_for {
            builder = builder.header("X-Forwarded-For", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        let addr = SocketAddr::new(peer.parse().unwrap(), 41000);
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    fn proxies() -> Vec<IpAddr> {
        vec![PROXY.parse().unwrap()]
    }

    #[test]
    fn untrusted_peer_cannot_choose_its_bucket() {
        let first = from_peer("198.51.100.9", Some("1.1.1.1"));
        let second = from_peer("198.51.100.9", Some("2.2.2.2"));

        assert_eq!(client_identifier(&first, &proxies()), "198.51.100.9");
        assert_eq!(client_identifier(&second, &proxies()), "198.51.100.9");
    }

    #[test]
    fn forwarded_headers_ignored_without_trusted_proxies() {
        let request = from_peer(PROXY, Some("203.0.113.7"));
        assert_eq!(client_identifier(&request, &[]), PROXY);
    }

    #[test]
    fn trusted_proxy_forwards_first_hop() {
        let request = from_peer(PROXY, Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_identifier(&request, &proxies()), "203.0.113.7");
    }

    #[test]
    fn trusted_proxy_falls_back_to_real_ip_then_peer() {
        let mut request = from_peer(PROXY, None);
        request
            .headers_mut()
            .insert("X-Real-IP", HeaderValue::from_static("203.0.113.8"));
        assert_eq!(client_identifier(&request, &proxies()), "203.0.113.8");

        let bare = from_peer(PROXY, Some("garbage"));
        assert_eq!(client_identifier(&bare, &proxies()), PROXY);
    }

    #[test]
    fn missing_peer_is_unknown() {
        let request = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_identifier(&request, &proxies()), "unknown");
    }

    #[test]
    fn auth_limits_are_stricter_than_general() {
        assert_eq!(LOGIN.max_requests, 5);
        assert_eq!(REGISTER.max_requests, 3);
        assert!(GENERAL.max_requests > LOGIN.max_requests);
    }
}
