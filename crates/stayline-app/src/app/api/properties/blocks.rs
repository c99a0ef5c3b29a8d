use chrono::NaiveDate;
use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};
use serde::{Deserialize, Serialize};

use super::calendars::FeedResponse;
use super::{json_body, uuid_param};
use crate::engine_handler::get_engine_from_depot;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub dates: Vec<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnblockRequest {
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct BlocksResponse {
    pub dates: usize,
    pub feed: FeedResponse,
}

/// ## Summary
/// POST `/api/properties/{property_id}/blocks` - blocks dates by hand.
///
/// ## Errors
/// Returns HTTP 400 for an empty date list, HTTP 404 for an unknown property.
#[handler]
async fn block(req: &mut Request, depot: &mut Depot) -> AppResult<Json<BlocksResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let body: BlockRequest = json_body(req).await?;
    let engine = get_engine_from_depot(depot)?;

    let feed = engine
        .manual
        .block_dates(property_id, &body.dates, body.reason)
        .await?;
    Ok(Json(BlocksResponse {
        dates: body.dates.len(),
        feed: feed.into(),
    }))
}

/// ## Summary
/// DELETE `/api/properties/{property_id}/blocks` - removes manual blocks.
///
/// ## Errors
/// Returns HTTP 400 for an empty date list, HTTP 404 for an unknown property.
#[handler]
async fn unblock(req: &mut Request, depot: &mut Depot) -> AppResult<Json<BlocksResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let body: UnblockRequest = json_body(req).await?;
    let engine = get_engine_from_depot(depot)?;

    let feed = engine.manual.unblock_dates(property_id, &body.dates).await?;
    Ok(Json(BlocksResponse {
        dates: body.dates.len(),
        feed: feed.into(),
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("blocks").post(block).delete(unblock)
}
