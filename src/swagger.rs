use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                handlers::auth::SESSION_COOKIE,
            ))),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::session,
        handlers::student::list_students,
        handlers::student::create_student,
        handlers::student::update_student,
        handlers::student::delete_student,
        handlers::draw::list_items,
        handlers::draw::create_item,
        handlers::draw::update_item,
        handlers::draw::delete_item,
        handlers::draw::pick_winner,
        handlers::draw::run_multi_draw,
        handlers::draw::update_winner,
        handlers::draw::set_winner_visibility,
        handlers::draw::delete_winner,
        handlers::draw::get_settings,
        handlers::draw::update_settings,
        handlers::live::get_state,
        handlers::live::get_events,
        handlers::live::get_recent_winners,
    ),
    components(
        schemas(
            ApiError,
            LoginRequest,
            SessionResponse,
            StudentQuery,
            CreateStudentRequest,
            UpdateStudentRequest,
            StudentResponse,
            DrawMode,
            PickResult,
            RandomFilters,
            PickRequest,
            CreateDrawItemRequest,
            UpdateDrawItemRequest,
            WinnerResponse,
            DrawItemResponse,
            UpdateWinnerRequest,
            WinnerVisibilityRequest,
            MultiDrawStepRequest,
            MultiDrawRequest,
            MultiDrawStepResult,
            MultiDrawResponse,
            DrawSettingsResponse,
            UpdateDrawSettingsRequest,
            LivePhase,
            CurrentReveal,
            LiveStateResponse,
            LiveEventQuery,
            LiveEventResponse,
            RecentWinnerResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin session API"),
        (name = "students", description = "Roster administration API"),
        (name = "draw", description = "Draw item and winner administration API"),
        (name = "live", description = "Public spectator feed API"),
    ),
    info(
        title = "Orientation Backend API",
        version = "1.0.0",
        description = "Orientation event draw backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
