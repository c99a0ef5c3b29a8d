//! Published outbound calendar feeds.

use salvo::http::StatusCode;
use salvo::http::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use salvo::{Depot, Request, Response, Router, handler};

use crate::engine_handler::get_engine_from_depot;
use crate::error::{AppError, AppResult};

/// ## Summary
/// GET `<feeds.public_path>/{filename}` - serves the stored feed body as
/// `text/calendar`.
///
/// ## Errors
/// Returns HTTP 404 if no property publishes under `filename`.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
async fn download(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    let filename = req
        .param::<String>("filename")
        .ok_or_else(|| AppError::BadRequest("filename is required".to_string()))?;
    let engine = get_engine_from_depot(depot)?;

    let feed = engine
        .store
        .feed_by_filename(&filename)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("feed {filename}")))?;

    tracing::debug!(property_id = %feed.property_id, bytes = feed.body.len(), "Serving feed");

    res.status_code(StatusCode::OK);
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/calendar; charset=utf-8"),
    );
    res.headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    res.write_body(feed.body)?;
    Ok(())
}

#[must_use]
pub fn routes(feed_path: &str) -> Router {
    let mount = feed_path.trim_matches('/');
    Router::with_path(format!("{mount}/{{filename}}")).get(download)
}
