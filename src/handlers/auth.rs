use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

use crate::models::*;
use crate::services::AuthService;
use crate::utils::SessionClaims;

pub const SESSION_COOKIE: &str = "session";

fn session_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded, session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(&request.id, &request.password) {
        Ok((token, session)) => Ok(HttpResponse::Ok()
            .cookie(session_cookie(token, session.expires_in))
            .json(json!({ "success": true, "data": session }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> Result<HttpResponse> {
    let mut expired = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    expired.make_removal();
    Ok(HttpResponse::Ok()
        .cookie(expired)
        .json(json!({ "success": true, "data": null })))
}

#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "auth",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn session(req: HttpRequest) -> Result<HttpResponse> {
    let claims = req.extensions().get::<SessionClaims>().cloned();
    match claims {
        Some(claims) => {
            let remaining = (claims.exp - Utc::now().timestamp()).max(0);
            let session = SessionResponse {
                admin_id: claims.sub,
                department: claims.department,
                expires_in: remaining,
            };
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": session })))
        }
        None => Ok(crate::error::AppError::AuthError("not logged in".to_string()).error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/session", web::get().to(session)),
    );
}
