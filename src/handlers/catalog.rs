use crate::middlewares::current_user;
use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------- products

pub async fn create_product(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .create_product(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_products(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match catalog_service.list_products(path.into_inner()).await {
        Ok(products) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": products
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_product(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (gym_id, product_id) = path.into_inner();
    match catalog_service.get_product(gym_id, product_id).await {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_product(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, product_id) = path.into_inner();

    match catalog_service
        .update_product(&actor, gym_id, product_id, request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_product(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, product_id) = path.into_inner();

    match catalog_service.delete_product(&actor, gym_id, product_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------------------------------------------------------------- plans

pub async fn create_plan(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CreatePlanRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog_service
        .create_plan(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list_plans(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match catalog_service.list_plans(path.into_inner()).await {
        Ok(plans) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plans
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_plan(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (gym_id, plan_id) = path.into_inner();
    match catalog_service.get_plan(gym_id, plan_id).await {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_plan(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdatePlanRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, plan_id) = path.into_inner();

    match catalog_service
        .update_plan(&actor, gym_id, plan_id, request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_plan(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, plan_id) = path.into_inner();

    match catalog_service.delete_plan(&actor, gym_id, plan_id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

/// 挂载在 `/gyms` scope 内
pub fn catalog_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{gym_id}/products", web::post().to(create_product))
        .route("/{gym_id}/products", web::get().to(list_products))
        .route("/{gym_id}/products/{id}", web::get().to(get_product))
        .route("/{gym_id}/products/{id}", web::put().to(update_product))
        .route("/{gym_id}/products/{id}", web::delete().to(delete_product))
        .route("/{gym_id}/plans", web::post().to(create_plan))
        .route("/{gym_id}/plans", web::get().to(list_plans))
        .route("/{gym_id}/plans/{id}", web::get().to(get_plan))
        .route("/{gym_id}/plans/{id}", web::put().to(update_plan))
        .route("/{gym_id}/plans/{id}", web::delete().to(delete_plan));
}
