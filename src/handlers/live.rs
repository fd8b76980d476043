use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::models::*;
use crate::services::LiveService;

#[utoipa::path(
    get,
    path = "/live/state",
    tag = "live",
    responses(
        (status = 200, description = "Spectator feed state for polling", body = LiveStateResponse)
    )
)]
pub async fn get_state(service: web::Data<LiveService>) -> Result<HttpResponse> {
    let state = service.state().await;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": state })))
}

#[utoipa::path(
    get,
    path = "/live/events",
    tag = "live",
    params(
        ("after_seq" = Option<i64>, Query, description = "Return only events past this sequence"),
        ("limit" = Option<u64>, Query, description = "Max events (default 50, max 200)")
    ),
    responses(
        (status = 200, description = "Public broadcast events in sequence order", body = [LiveEventResponse])
    )
)]
pub async fn get_events(
    service: web::Data<LiveService>,
    query: web::Query<LiveEventQuery>,
) -> Result<HttpResponse> {
    match service.events_after(&query.into_inner()).await {
        Ok(events) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": events }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecentWinnersQuery {
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/live/recent-winners",
    tag = "live",
    params(
        ("limit" = Option<u64>, Query, description = "Max entries (default 20)")
    ),
    responses(
        (status = 200, description = "Recent public winners, empty when disabled", body = [RecentWinnerResponse])
    )
)]
pub async fn get_recent_winners(
    service: web::Data<LiveService>,
    query: web::Query<RecentWinnersQuery>,
) -> Result<HttpResponse> {
    match service.recent_winners(query.limit.unwrap_or(20)).await {
        Ok(winners) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": winners }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn live_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/live")
            .route("/state", web::get().to(get_state))
            .route("/events", web::get().to(get_events))
            .route("/recent-winners", web::get().to(get_recent_winners)),
    );
}
