//! Calendar management, sync and conflict endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stayline_db::db::enums::SyncStatus;
use stayline_db::model::blocked_date::BlockedDate;
use stayline_db::model::calendar::ExternalCalendar;
use stayline_db::model::feed::CalendarFeed;
use stayline_service::conflicts::ConflictReport;
use stayline_service::sync::SyncReport;

use super::{json_body, query, uuid_param};
use crate::engine_handler::get_engine_from_depot;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub id: Uuid,
    pub name: String,
    pub feed_url: String,
    pub enabled: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: SyncStatus,
    pub sync_error: Option<String>,
    pub total_events: i32,
}

impl From<ExternalCalendar> for CalendarResponse {
    fn from(calendar: ExternalCalendar) -> Self {
        Self {
            id: calendar.id,
            name: calendar.name,
            feed_url: calendar.feed_url,
            enabled: calendar.enabled,
            last_sync_at: calendar.last_sync_at,
            last_sync_status: calendar.last_sync_status,
            sync_error: calendar.sync_error,
            total_events: calendar.total_events,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub feed_url: String,
    pub filename: String,
    pub blocked_day_count: i32,
    pub generated_at: DateTime<Utc>,
}

impl From<CalendarFeed> for FeedResponse {
    fn from(feed: CalendarFeed) -> Self {
        Self {
            feed_url: feed.feed_url,
            filename: feed.filename,
            blocked_day_count: feed.blocked_day_count,
            generated_at: feed.generated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockedDateResponse {
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub source_calendar_id: Option<Uuid>,
    pub is_check_in: bool,
    pub is_check_out: bool,
}

impl From<BlockedDate> for BlockedDateResponse {
    fn from(row: BlockedDate) -> Self {
        Self {
            date: row.date,
            reason: row.reason,
            source_calendar_id: row.source_calendar_id,
            is_check_in: row.is_check_in,
            is_check_out: row.is_check_out,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub calendars: Vec<CalendarResponse>,
    pub blocked_dates: Vec<BlockedDateResponse>,
    pub feed: Option<FeedResponse>,
}

#[derive(Debug, Deserialize)]
pub struct AddCalendarRequest {
    pub name: String,
    pub feed_url: String,
}

#[derive(Debug, Serialize)]
pub struct AddCalendarResponse {
    pub calendar: CalendarResponse,
    pub event_count: usize,
    pub feed: FeedResponse,
}

#[derive(Debug, Deserialize)]
pub struct RemoveCalendarQuery {
    #[serde(default)]
    pub delete_blocks: bool,
}

#[derive(Debug, Serialize)]
pub struct CalendarSyncResponse {
    pub calendar_id: Uuid,
    pub event_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ConflictRequest {
    pub calendar_ids: Vec<Uuid>,
}

/// ## Summary
/// GET `/api/properties/{property_id}/calendar` - calendars, blocked dates
/// and published feed of a property.
///
/// ## Errors
/// Returns HTTP 500 if the store fails.
#[handler]
async fn show_overview(req: &mut Request, depot: &mut Depot) -> AppResult<Json<OverviewResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let engine = get_engine_from_depot(depot)?;

    let overview = engine.aggregator.overview(property_id).await?;
    Ok(Json(OverviewResponse {
        calendars: overview.calendars.into_iter().map(Into::into).collect(),
        blocked_dates: overview.blocked.into_iter().map(Into::into).collect(),
        feed: overview.feed.map(Into::into),
    }))
}

/// ## Summary
/// POST `/api/properties/{property_id}/calendars` - validates, registers and
/// imports an external feed.
///
/// ## Errors
/// Returns HTTP 400 if the feed fails validation, HTTP 404 for an unknown
/// property.
#[handler]
async fn add(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let property_id = uuid_param(req, "property_id")?;
    let body: AddCalendarRequest = json_body(req).await?;
    let engine = get_engine_from_depot(depot)?;

    let added = engine
        .calendars
        .add_calendar(property_id, &body.name, &body.feed_url)
        .await?;

    res.status_code(StatusCode::CREATED);
    res.render(Json(AddCalendarResponse {
        calendar: added.calendar.into(),
        event_count: added.event_count,
        feed: added.feed.into(),
    }));
    Ok(())
}

/// ## Summary
/// DELETE `/api/properties/{property_id}/calendars/{calendar_id}[?delete_blocks=true]`
///
/// ## Errors
/// Returns HTTP 404 for an unknown property or calendar.
#[handler]
async fn remove(req: &mut Request, depot: &mut Depot) -> AppResult<Json<FeedResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let calendar_id = uuid_param(req, "calendar_id")?;
    let params: RemoveCalendarQuery = query(req)?;
    let engine = get_engine_from_depot(depot)?;

    let feed = engine
        .calendars
        .remove_calendar(property_id, calendar_id, params.delete_blocks)
        .await?;
    Ok(Json(feed.into()))
}

/// ## Summary
/// POST `/api/properties/{property_id}/calendars/{calendar_id}/toggle`
///
/// ## Errors
/// Returns HTTP 404 for an unknown property or calendar.
#[handler]
async fn toggle(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CalendarResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let calendar_id = uuid_param(req, "calendar_id")?;
    let engine = get_engine_from_depot(depot)?;

    let calendar = engine
        .calendars
        .toggle_calendar(property_id, calendar_id)
        .await?;
    Ok(Json(calendar.into()))
}

/// ## Summary
/// POST `/api/properties/{property_id}/calendars/{calendar_id}/sync`
///
/// ## Errors
/// Returns HTTP 502 if the feed could not be loaded (the failure is still
/// recorded), HTTP 404 for an unknown property or calendar.
#[handler]
async fn sync_one(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CalendarSyncResponse>> {
    let property_id = uuid_param(req, "property_id")?;
    let calendar_id = uuid_param(req, "calendar_id")?;
    let engine = get_engine_from_depot(depot)?;

    let event_count = engine.syncer.sync_calendar(property_id, calendar_id).await?;
    Ok(Json(CalendarSyncResponse {
        calendar_id,
        event_count,
    }))
}

/// ## Summary
/// POST `/api/properties/{property_id}/sync` - syncs every enabled calendar.
///
/// ## Errors
/// Returns HTTP 404 for an unknown property.
#[handler]
async fn sync_all(req: &mut Request, depot: &mut Depot) -> AppResult<Json<SyncReport>> {
    let property_id = uuid_param(req, "property_id")?;
    let engine = get_engine_from_depot(depot)?;

    Ok(Json(engine.syncer.sync_property_calendars(property_id).await?))
}

/// ## Summary
/// POST `/api/properties/{property_id}/conflicts` - dates booked on more than
/// one of the given calendars.
///
/// ## Errors
/// Returns HTTP 400 for a malformed body.
#[handler]
async fn conflicts(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ConflictReport>> {
    let property_id = uuid_param(req, "property_id")?;
    let body: ConflictRequest = json_body(req).await?;
    let engine = get_engine_from_depot(depot)?;

    let report = engine
        .conflicts
        .analyze_calendar_conflicts(property_id, &body.calendar_ids)
        .await?;
    Ok(Json(report))
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("calendar").get(show_overview))
        .push(
            Router::with_path("calendars").post(add).push(
                Router::with_path("{calendar_id}")
                    .delete(remove)
                    .push(Router::with_path("toggle").post(toggle))
                    .push(Router::with_path("sync").post(sync_one)),
            ),
        )
        .push(Router::with_path("sync").post(sync_all))
        .push(Router::with_path("conflicts").post(conflicts))
}
