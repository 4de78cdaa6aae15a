use crate::middlewares::current_user;
use crate::models::*;
use crate::services::CustomerService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

pub async fn list_gym_customers(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service
        .list_for_gym(&actor, path.into_inner(), &query)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service
        .create_manual(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(customer) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": customer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, customer_id) = path.into_inner();

    match customer_service
        .update_manual(&actor, gym_id, customer_id, request.into_inner())
        .await
    {
        Ok(customer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": customer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete_customer(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };
    let (gym_id, customer_id) = path.into_inner();

    match customer_service
        .delete_manual(&actor, gym_id, customer_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

/// 当前用户的订阅
pub async fn my_subscriptions(
    customer_service: web::Data<CustomerService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match customer_service.my_subscriptions(&actor).await {
        Ok(customers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": customers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 挂载在 `/gyms` scope 内
pub fn gym_customer_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{gym_id}/customers", web::get().to(list_gym_customers))
        .route("/{gym_id}/customers", web::post().to(create_customer))
        .route("/{gym_id}/customers/{id}", web::put().to(update_customer))
        .route("/{gym_id}/customers/{id}", web::delete().to(delete_customer));
}

pub fn customer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/customers").route("/me", web::get().to(my_subscriptions)));
}
