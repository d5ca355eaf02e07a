//! # Middleware Module
//!
//! Global rate limiting for the Query Facade.
//!
//! `TRELLIS_RATE_LIMIT` sets requests per second (default 100, `0` disables).

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

pub const ENV_RATE_LIMIT: &str = "TRELLIS_RATE_LIMIT";

const DEFAULT_RPS: u32 = 100;

/// Shared, unkeyed limiter.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a limiter allowing `requests_per_second`; `None` when zero.
pub fn create_rate_limiter(requests_per_second: u32) -> Option<GlobalRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second)?;
    Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
}

/// Requests per second from `TRELLIS_RATE_LIMIT`; unparsable values fall back to the default.
pub fn get_rate_limit_from_env() -> u32 {
    parse_rate_limit(std::env::var(ENV_RATE_LIMIT).ok().as_deref())
}

fn parse_rate_limit(raw: Option<&str>) -> u32 {
    match raw.map(|s| s.trim().parse::<u32>()) {
        Some(Ok(rps)) => rps,
        Some(Err(_)) => {
            tracing::warn!("{} is not a number, using {}", ENV_RATE_LIMIT, DEFAULT_RPS);
            DEFAULT_RPS
        }
        None => DEFAULT_RPS,
    }
}

/// Reject with 429 once the limiter is exhausted.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_err() {
        tracing::warn!("Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("Too Many Requests")),
        )
            .into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_disables_limiting() {
        assert!(create_rate_limiter(0).is_none());
    }

    #[test]
    fn limiter_allows_first_request() {
        let limiter = create_rate_limiter(1).expect("enabled");
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn rate_limit_parsing() {
        assert_eq!(parse_rate_limit(None), 100);
        assert_eq!(parse_rate_limit(Some(" 25 ")), 25);
        assert_eq!(parse_rate_limit(Some("0")), 0);
        assert_eq!(parse_rate_limit(Some("fast")), 100);
    }
}
