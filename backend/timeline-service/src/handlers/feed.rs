use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::metrics::{FEED_REQUESTS_TOTAL, FEED_REQUEST_DURATION_SECONDS};
use crate::middleware::UserId;
use crate::services::FeedService;

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

pub struct FeedHandlerState {
    pub feed: Arc<FeedService>,
    pub shutdown: CancellationToken,
}

/// GET /api/v1/feed
///
/// Returns one ranked page of the viewer's home timeline. An omitted or
/// malformed cursor yields the first page; the response carries a
/// `nextCursor` only when older posts remain.
pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    http_req: HttpRequest,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let user_id = http_req
        .extensions()
        .get::<UserId>()
        .map(|u| u.0)
        .ok_or_else(|| AppError::Unauthorized("Missing user context".into()))?;

    debug!(
        "Feed request: user={} limit={:?} cursor={}",
        user_id,
        query.limit,
        query.cursor.is_some()
    );

    let start = Instant::now();
    // Requests in flight observe shutdown through a child token.
    let cancel = state.shutdown.child_token();
    let result = state
        .feed
        .get_feed(user_id, query.cursor.as_deref(), query.limit, &cancel)
        .await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::Cancelled) => "cancelled",
        Err(_) => "error",
    };
    FEED_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    FEED_REQUEST_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());

    Ok(HttpResponse::Ok().json(result?))
}
