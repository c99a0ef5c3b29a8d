use chrono::NaiveDate;
use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};
use serde::{Deserialize, Serialize};

use stayline_service::availability::{AvailabilityResult, Window, cheapest_window};

use super::{query, uuid_param};
use crate::engine_handler::get_engine_from_depot;
use crate::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub tolerance_days: u32,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub duration: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub nights: u32,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct WindowsResponse {
    pub windows: Vec<Window>,
    pub cheapest: Option<Window>,
}

/// ## Summary
/// GET `/api/properties/{property_id}/availability`
///
/// ## Errors
/// Returns HTTP 400 for an invalid stay, HTTP 404 for an unknown property.
#[handler]
async fn check(req: &mut Request, depot: &mut Depot) -> AppResult<Json<AvailabilityResult>> {
    let property_id = uuid_param(req, "property_id")?;
    let params: AvailabilityQuery = query(req)?;
    let engine = get_engine_from_depot(depot)?;

    let result = engine
        .availability
        .check_availability(
            property_id,
            params.check_in,
            params.check_out,
            params.tolerance_days,
        )
        .await?;
    Ok(Json(result))
}

/// ## Summary
/// GET `/api/properties/{property_id}/windows?duration=..&start=..&end=..`
///
/// ## Errors
/// Returns HTTP 400 for a zero duration, HTTP 404 for an unknown property.
#[handler]
async fn list_windows(req: &mut Request, depot: &mut Depot) -> AppResult<Json<WindowsResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let params: WindowQuery = query(req)?;
    let engine = get_engine_from_depot(depot)?;

    let windows = engine
        .availability
        .find_windows(property_id, params.duration, params.start, params.end)
        .await?;
    let cheapest = cheapest_window(&windows).cloned();

    Ok(Json(WindowsResponse { windows, cheapest }))
}

/// ## Summary
/// GET `/api/properties/{property_id}/periods?nights=..[&month=..][&year=..]`
///
/// ## Errors
/// Returns HTTP 400 for zero nights or an invalid month, HTTP 404 for an
/// unknown property.
#[handler]
async fn list_periods(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<Window>>> {
    let property_id = uuid_param(req, "property_id")?;
    let params: PeriodQuery = query(req)?;
    let engine = get_engine_from_depot(depot)?;

    let periods = engine
        .availability
        .find_available_periods(property_id, params.nights, params.month, params.year)
        .await?;
    Ok(Json(periods))
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("availability").get(check))
        .push(Router::with_path("windows").get(list_windows))
        .push(Router::with_path("periods").get(list_periods))
}
