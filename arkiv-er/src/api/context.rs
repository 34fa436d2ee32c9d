//! Per-request caller identity
//!
//! Authentication happens upstream; the proxy forwards the eperson id in
//! [`EPERSON_HEADER`]. Requests without it are anonymous.

use super::error::ApiError;
use arkiv_common::parse_id;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const EPERSON_HEADER: &str = "x-arkiv-eperson";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    /// Authenticated eperson id, `None` for anonymous callers
    pub principal: Option<i64>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(EPERSON_HEADER) else {
            return Ok(RequestContext::default());
        };

        let raw = raw
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{} is not valid text", EPERSON_HEADER)))?;
        let principal = parse_id(raw.trim(), "eperson id")?;

        Ok(RequestContext {
            principal: Some(principal),
        })
    }
}
