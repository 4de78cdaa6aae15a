use crate::middlewares::current_user;
use crate::models::*;
use crate::services::AttendanceService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn check_in(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
    request: web::Json<AttendanceRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match attendance_service.check_in(&actor, request.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": record
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn check_out(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
    request: web::Json<AttendanceRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match attendance_service.check_out(&actor, request.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": record
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_attendance(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match attendance_service.list(&actor, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn attendance_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("", web::get().to(list_attendance))
            .route("/check-in", web::post().to(check_in))
            .route("/check-out", web::post().to(check_out)),
    );
}
