// handlers/extract.rs - request extractors shared by the API handlers

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

use crate::database::models::EntityKind;
use crate::database::Page;
use crate::error::ApiError;

/// Widest value accepted for any text column.
pub const MAX_TEXT_LEN: usize = 255;

/// `Json<T>` whose rejections are reported through [`ApiError`].
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::invalid_json(rejection.body_text())),
        }
    }
}

/// `?limit=&offset=` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListQuery {
    /// The requested window, with `limit` clamped to `max_limit`.
    pub fn page(self, max_limit: Option<u64>) -> Page {
        let limit = match (self.limit, max_limit) {
            (Some(requested), Some(max)) => Some(requested.min(max)),
            (requested, max) => requested.or(max),
        };
        Page::new(limit, self.offset.unwrap_or(0))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ListQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(query)
    }
}

/// Path ids that are not UUIDs cannot name a record, so they are reported as
/// not found rather than as a malformed request.
pub fn parse_id(kind: EntityKind, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", kind)))
}

/// A present, non-blank value of at most [`MAX_TEXT_LEN`] characters, trimmed.
pub fn required_text(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    match value {
        Some(value) => checked_text(field, value),
        None => Err(ApiError::field_error(field, "This field is required")),
    }
}

/// Like [`required_text`], but an absent value is fine.
pub fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>, ApiError> {
    value.map(|value| checked_text(field, value)).transpose()
}

fn checked_text(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::field_error(field, "This field may not be blank"));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::field_error(
            field,
            format!("Ensure this field has no more than {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(value.to_string())
}
