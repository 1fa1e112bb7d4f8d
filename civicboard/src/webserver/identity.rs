//! Caller identity for the unauthenticated surface. The platform ships
//! without accounts, so a pseudo identity is derived from the caller's
//! network address and threaded through every storage call as an explicit
//! parameter.

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

fn guest(ip: &str) -> String {
    format!("guest_{}", ip)
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // behind the reverse proxy the peer address is the proxy itself
        if let Some(forwarded) = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
        {
            if let Some(ip) = forwarded
                .split(',')
                .next()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
            {
                return Ok(CallerIdentity(guest(ip)));
            }
        }
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_owned());
        Ok(CallerIdentity(guest(&ip)))
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    use super::CallerIdentity;

    #[tokio::test]
    async fn forwarded_header_wins_over_peer_address() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .expect("request should build");
        let (mut parts, _) = request.into_parts();
        let CallerIdentity(identity) = CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(identity, "guest_203.0.113.7");
    }

    #[tokio::test]
    async fn missing_peer_information_falls_back_to_unknown() {
        let request = Request::builder().body(()).expect("request should build");
        let (mut parts, _) = request.into_parts();
        let CallerIdentity(identity) = CallerIdentity::from_request_parts(&mut parts, &())
            .await
            .expect("extraction is infallible");
        assert_eq!(identity, "guest_unknown");
    }
}
