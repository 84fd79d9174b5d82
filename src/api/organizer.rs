//! Identification of the requesting organizer. The session layer in
//! front of the API authenticates the user and forwards their id.

use axum::extract::FromRequestParts;
use http::request::Parts;

use super::public::ApiError;
use crate::core::PlannerError;

pub const ORGANIZER_HEADER: &str = "x-organizer-id";

#[derive(Debug, Clone, Copy)]
pub struct Organizer(pub i64);

impl<S> FromRequestParts<S> for Organizer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ORGANIZER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| PlannerError::unauthorized("Login required"))?;
        Ok(Organizer(id))
    }
}
