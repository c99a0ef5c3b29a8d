use chrono::NaiveDate;
use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stayline_service::pricing::CalculatedPrice;

use super::{query, uuid_param};
use crate::engine_handler::get_engine_from_depot;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// `price` is `null` when no tariff covers the stay.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub price: Option<CalculatedPrice>,
}

/// ## Summary
/// GET `/api/properties/{property_id}/quote?check_in=..&check_out=..`
///
/// ## Errors
/// Returns HTTP 400 for malformed parameters, HTTP 500 if tariffs cannot
/// be loaded.
#[handler]
async fn quote(req: &mut Request, depot: &mut Depot) -> AppResult<Json<QuoteResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let params: QuoteQuery = query(req)?;
    let engine = get_engine_from_depot(depot)?;

    let price = engine
        .pricing
        .calculate_price(property_id, params.check_in, params.check_out)
        .await?;

    Ok(Json(QuoteResponse {
        property_id,
        check_in: params.check_in,
        check_out: params.check_out,
        price,
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("quote").get(quote)
}
