use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::{DrawEngine, DrawItemService, StudentService};

#[utoipa::path(
    get,
    path = "/draw/items",
    tag = "draw",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Items with winners and computed quota view", body = [DrawItemResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_items(
    items: web::Data<DrawItemService>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse> {
    let result = async {
        let pool = students.load_pool().await?;
        let computed = items.list_computed().await?;
        Ok::<_, crate::error::AppError>(
            computed
                .iter()
                .map(|entry| DrawItemResponse::from_computed(entry, &pool))
                .collect::<Vec<_>>(),
        )
    }
    .await;

    match result {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/items",
    tag = "draw",
    request_body = CreateDrawItemRequest,
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Item created"),
        (status = 400, description = "Invalid name or quota")
    )
)]
pub async fn create_item(
    items: web::Data<DrawItemService>,
    request: web::Json<CreateDrawItemRequest>,
) -> Result<HttpResponse> {
    match items.create_item(request.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": item }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/draw/items/{item_id}",
    tag = "draw",
    request_body = UpdateDrawItemRequest,
    params(("item_id" = i64, Path, description = "Draw item id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Quota below recorded winners"),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn update_item(
    items: web::Data<DrawItemService>,
    path: web::Path<i64>,
    request: web::Json<UpdateDrawItemRequest>,
) -> Result<HttpResponse> {
    match items.update_item(path.into_inner(), request.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": item }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/draw/items/{item_id}",
    tag = "draw",
    params(("item_id" = i64, Path, description = "Draw item id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Item and its winners removed"),
        (status = 404, description = "Unknown item")
    )
)]
pub async fn delete_item(
    items: web::Data<DrawItemService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match items.delete_item(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": null }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/items/{item_id}/pick",
    tag = "draw",
    request_body = PickRequest,
    params(("item_id" = i64, Path, description = "Draw item id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Pick outcome", body = PickResult),
        (status = 404, description = "Unknown item or draw number"),
        (status = 409, description = "Quota exhausted, duplicate winner, or confirmation required")
    )
)]
pub async fn pick_winner(
    engine: web::Data<DrawEngine>,
    path: web::Path<i64>,
    request: web::Json<PickRequest>,
) -> Result<HttpResponse> {
    match engine.pick_winner(path.into_inner(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/draw/multi",
    tag = "draw",
    request_body = MultiDrawRequest,
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Per-step outcomes; halts at the first failure", body = MultiDrawResponse),
        (status = 400, description = "Empty step list")
    )
)]
pub async fn run_multi_draw(
    engine: web::Data<DrawEngine>,
    request: web::Json<MultiDrawRequest>,
) -> Result<HttpResponse> {
    match engine.run_multi_draw(request.into_inner()).await {
        Ok(outcome) => {
            let response: MultiDrawResponse = outcome.into();
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": response })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/draw/winners/{winner_id}",
    tag = "draw",
    request_body = UpdateWinnerRequest,
    params(("winner_id" = i64, Path, description = "Winner record id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Reassignment outcome", body = PickResult),
        (status = 404, description = "Unknown record or draw number"),
        (status = 409, description = "Duplicate winner or confirmation required")
    )
)]
pub async fn update_winner(
    engine: web::Data<DrawEngine>,
    path: web::Path<i64>,
    request: web::Json<UpdateWinnerRequest>,
) -> Result<HttpResponse> {
    match engine.update_winner(path.into_inner(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/draw/winners/{winner_id}/visibility",
    tag = "draw",
    request_body = WinnerVisibilityRequest,
    params(("winner_id" = i64, Path, description = "Winner record id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Visibility updated", body = WinnerResponse),
        (status = 404, description = "Unknown record")
    )
)]
pub async fn set_winner_visibility(
    engine: web::Data<DrawEngine>,
    path: web::Path<i64>,
    request: web::Json<WinnerVisibilityRequest>,
) -> Result<HttpResponse> {
    match engine
        .set_winner_visibility(path.into_inner(), request.is_public)
        .await
    {
        Ok(winner) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": winner }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/draw/winners/{winner_id}",
    tag = "draw",
    params(("winner_id" = i64, Path, description = "Winner record id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Winner removed, quota unit freed"),
        (status = 404, description = "Unknown record")
    )
)]
pub async fn delete_winner(
    engine: web::Data<DrawEngine>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match engine.delete_winner(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": null }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/draw/settings",
    tag = "draw",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Global draw settings", body = DrawSettingsResponse)
    )
)]
pub async fn get_settings(items: web::Data<DrawItemService>) -> Result<HttpResponse> {
    match items.get_settings().await {
        Ok(settings) => {
            let response: DrawSettingsResponse = settings.into();
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": response })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/draw/settings",
    tag = "draw",
    request_body = UpdateDrawSettingsRequest,
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Settings updated", body = DrawSettingsResponse)
    )
)]
pub async fn update_settings(
    items: web::Data<DrawItemService>,
    request: web::Json<UpdateDrawSettingsRequest>,
) -> Result<HttpResponse> {
    match items.update_settings(request.into_inner()).await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": settings }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draw")
            .route("/items", web::get().to(list_items))
            .route("/items", web::post().to(create_item))
            .route("/items/{item_id}", web::put().to(update_item))
            .route("/items/{item_id}", web::delete().to(delete_item))
            .route("/items/{item_id}/pick", web::post().to(pick_winner))
            .route("/multi", web::post().to(run_multi_draw))
            .route("/winners/{winner_id}", web::put().to(update_winner))
            .route(
                "/winners/{winner_id}/visibility",
                web::put().to(set_winner_visibility),
            )
            .route("/winners/{winner_id}", web::delete().to(delete_winner))
            .route("/settings", web::get().to(get_settings))
            .route("/settings", web::put().to(update_settings)),
    );
}
