use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::StudentService;

#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(
        ("page" = Option<u32>, Query, description = "Page number (default 1)"),
        ("per_page" = Option<u32>, Query, description = "Page size (default 20)"),
        ("department" = Option<String>, Query, description = "Filter by department"),
        ("search" = Option<String>, Query, description = "Match student id or draw number")
    ),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Paginated roster", body = PaginatedResponse<StudentResponse>),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_students(
    service: web::Data<StudentService>,
    query: web::Query<StudentQuery>,
) -> Result<HttpResponse> {
    match service.list(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = CreateStudentRequest,
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid student id or draw number")
    )
)]
pub async fn create_student(
    service: web::Data<StudentService>,
    request: web::Json<CreateStudentRequest>,
) -> Result<HttpResponse> {
    match service.create(request.into_inner()).await {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": student }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/students/{student_id}",
    tag = "students",
    request_body = UpdateStudentRequest,
    params(("student_id" = String, Path, description = "Student id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 404, description = "Unknown student")
    )
)]
pub async fn update_student(
    service: web::Data<StudentService>,
    path: web::Path<String>,
    request: web::Json<UpdateStudentRequest>,
) -> Result<HttpResponse> {
    match service.update(&path.into_inner(), request.into_inner()).await {
        Ok(student) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": student }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/students/{student_id}",
    tag = "students",
    params(("student_id" = String, Path, description = "Student id")),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Student removed"),
        (status = 404, description = "Unknown student")
    )
)]
pub async fn delete_student(
    service: web::Data<StudentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.delete(&path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": null }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn student_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .route("", web::get().to(list_students))
            .route("", web::post().to(create_student))
            .route("/{student_id}", web::put().to(update_student))
            .route("/{student_id}", web::delete().to(delete_student)),
    );
}
