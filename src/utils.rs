// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use actix_web::http::StatusCode;
use governor::{RateLimiter, clock::DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use log::{error, info};
use std::net::IpAddr;
use std::fmt;
use crate::transport::TransportError;

pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

pub const INTERNAL_ERROR_BODY: &str = r#"{"status": "internal server error"}"#;

const CF_CONNECTING_IP: &str = "CF-Connecting-IP";

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIP,
    RateLimitExceeded,
    Upstream(TransportError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIP => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::Upstream(e) => write!(f, "Game server unavailable: {}", e),
        }
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        Self::Upstream(err)
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingPeerIP => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // the transport error may name addresses, keep it in the log only
            Self::Upstream(e) => {
                error!("{}", e);
                HttpResponse::InternalServerError()
                    .content_type("application/json")
                    .body(INTERNAL_ERROR_BODY)
            }
            _ => HttpResponse::build(self.status_code()).body(self.to_string()),
        }
    }
}

/// Socket peer of the request. Forwarding headers are client-controlled and
/// never used as a rate-limit key.
pub fn client_ip(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    req.peer_addr().map(|addr| addr.ip()).ok_or(RequestError::MissingPeerIP)
}

pub fn check_rate_limit(limiter: &IpRateLimiter, ip: IpAddr) -> Result<(), RequestError> {
    if limiter.check_key(&ip).is_err() {
        error!("Rate limit exceeded for {}", ip);
        return Err(RequestError::RateLimitExceeded);
    }
    Ok(())
}

pub fn log_request(req: &HttpRequest) {
    let remote = req.headers()
        .get(CF_CONNECTING_IP)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or("(local)");
    info!("{} {:?} from {}", req.method(), req.path(), remote);
}
