//! JSON API of a single property under `/api/properties/{property_id}`.

mod availability;
mod blocks;
mod calendars;
mod quote;

use salvo::{Request, Router};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::PROPERTY_ROUTE_COMPONENT;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(PROPERTY_ROUTE_COMPONENT).push(
        Router::with_path("{property_id}")
            .push(quote::routes())
            .push(availability::routes())
            .push(calendars::routes())
            .push(blocks::routes()),
    )
}

/// ## Summary
/// Parses a UUID path parameter.
///
/// ## Errors
/// Returns `BadRequest` if the parameter is missing or not a UUID.
pub(crate) fn uuid_param(req: &Request, name: &str) -> AppResult<Uuid> {
    let raw = req
        .param::<String>(name)
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))?;
    Uuid::parse_str(&raw).map_err(|_err| AppError::BadRequest(format!("invalid {name}: {raw}")))
}

/// ## Summary
/// Deserializes the query string.
///
/// ## Errors
/// Returns `BadRequest` if a parameter is missing or malformed.
pub(crate) fn query<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_queries::<T>()
        .map_err(|e| AppError::BadRequest(format!("invalid query: {e}")))
}

/// ## Summary
/// Deserializes a JSON request body.
///
/// ## Errors
/// Returns `BadRequest` if the body is not valid JSON of the expected shape.
pub(crate) async fn json_body<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
}
