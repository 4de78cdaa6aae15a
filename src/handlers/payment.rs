use crate::config::StripeConfig;
use crate::error::AppError;
use crate::external::stripe_webhook::{SIGNATURE_HEADER, construct_event};
use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{CheckoutService, PaymentService, ReconcileService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use log::{error, info, warn};
use serde_json::json;
use uuid::Uuid;

/// 发起结账; 未传 user_id 时使用当前登录用户
pub async fn create_checkout(
    checkout_service: web::Data<CheckoutService>,
    req: HttpRequest,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    let mut request = request.into_inner();
    request.user_id.get_or_insert(actor.id);

    match checkout_service.create_checkout(request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

/// Stripe webhook
///
/// 签名或 payload 不合法返回 400 且不做任何处理;
/// 校验通过后的处理失败只记录日志并返回 200, 避免 Stripe 重复投递
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    stripe_config: web::Data<StripeConfig>,
    reconcile_service: web::Data<ReconcileService>,
) -> Result<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = match construct_event(
        &body,
        signature,
        &stripe_config.webhook_secret,
        stripe_config.webhook_tolerance_secs,
    ) {
        Ok(event) => event,
        Err(e) if e.is_signature_error() => {
            warn!("Webhook signature verification failed: {e}");
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid signature"
            })));
        }
        Err(e) => {
            error!("Webhook payload rejected: {e}");
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid payload"
            })));
        }
    };

    let event_type = event.event_type().to_string();
    info!("Received Stripe webhook event: {event_type}");

    match reconcile_service.handle_event(event).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "received": true
        }))),
        Err(e) => {
            error!("Failed to process webhook event {event_type}: {e}");
            Ok(HttpResponse::Ok().json(json!({
                "received": true,
                "error": "Processing failed"
            })))
        }
    }
}

/// Stripe 成功跳转 (`session_id`) 或货到付款跳转 (`order_id`)
pub async fn payment_success(
    reconcile_service: web::Data<ReconcileService>,
    query: web::Query<PaymentSuccessQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    if let Some(session_id) = query.session_id.filter(|s| !s.is_empty()) {
        return match reconcile_service.handle_success(&session_id).await {
            Ok(response) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": response
            }))),
            Err(e) => Ok(e.error_response()),
        };
    }

    if let Some(order_id) = query.order_id {
        return match reconcile_service.confirm_order(order_id).await {
            Ok(order) => Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Order confirmed",
                "data": order
            }))),
            Err(e) => Ok(e.error_response()),
        };
    }

    Ok(AppError::ValidationError("session_id or order_id is required".to_string()).error_response())
}

pub async fn payment_cancel() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "message": "Payment was canceled"
    })))
}

pub async fn list_payments(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    query: web::Query<PaymentListQuery>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service.list_for_gym(&actor, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service.create_manual(&actor, request.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdatePaymentRequest>,
) -> Result<HttpResponse> {
    let actor = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .update_payment(&actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 挂载在根路径, 不在 `/api/v1` 之下
pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payment")
            .route("/", web::post().to(create_checkout))
            .route("/webhook/", web::post().to(stripe_webhook))
            .route("/payment-success/", web::get().to(payment_success))
            .route("/payment-cancel/", web::get().to(payment_cancel))
            .route("/details/", web::get().to(list_payments))
            .route("/details/", web::post().to(create_payment))
            .route("/details/{id}", web::put().to(update_payment)),
    );
}
