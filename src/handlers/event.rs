use crate::middlewares::current_user;
use crate::models::*;
use crate::services::EventService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

pub async fn create_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service
        .create_event(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(event) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_events(
    event_service: web::Data<EventService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match event_service.list_events(path.into_inner()).await {
        Ok(events) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": events
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_all_events(
    event_service: web::Data<EventService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match event_service.list_all_events(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_event(
    event_service: web::Data<EventService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (gym_id, event_id) = path.into_inner();
    match event_service.get_event(gym_id, event_id).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, event_id) = path.into_inner();

    match event_service
        .update_event(&actor, gym_id, event_id, request.into_inner())
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, event_id) = path.into_inner();

    match event_service.delete_event(&actor, gym_id, event_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn event_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{gym_id}/events", web::post().to(create_event))
        .route("/{gym_id}/events", web::get().to(list_events))
        .route("/{gym_id}/events/{id}", web::get().to(get_event))
        .route("/{gym_id}/events/{id}", web::put().to(update_event))
        .route("/{gym_id}/events/{id}", web::delete().to(delete_event));
}

/// 跨健身房的公开活动列表
pub fn public_event_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(list_all_events));
}
