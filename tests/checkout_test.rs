mod common;

use actix_web::test;
use common::{TestContext, build_app};
use gym_backend::entities::order_entity as orders;
use gym_backend::external::CheckoutMode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

#[actix_web::test]
async fn cod_checkout_creates_order_without_provider_calls() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym = ctx.create_gym(&admin, true).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/payment/")
        .insert_header(ctx.bearer(&member))
        .set_json(json!({
            "stripe_price_id": "price_123",
            "product_type": "protein",
            "gym_id": gym.id,
            "username": "member1",
            "address": "2 Side St",
            "promo_code": "SAVE10",
            "payment_type": "cod"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    let success_url = body["successUrl"].as_str().unwrap();
    assert!(success_url.starts_with("https://gym.example.com/payment/payment-success/?order_id="));
    assert!(body.get("sessionId").is_none());

    assert!(ctx.gateway.calls().is_empty());
    assert_eq!(orders::Entity::find().count(&ctx.pool).await.unwrap(), 1);

    let order = orders::Entity::find().one(&ctx.pool).await.unwrap().unwrap();
    assert_eq!(order.user_id, Some(member.id));
    assert_eq!(order.payment_type, "cod");
}

#[actix_web::test]
async fn checkout_mode_follows_product_type() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    for (product_type, expected) in [
        ("subscription", CheckoutMode::Subscription),
        ("supplement", CheckoutMode::Payment),
    ] {
        let req = test::TestRequest::post()
            .uri("/payment/")
            .insert_header(ctx.bearer(&member))
            .set_json(json!({
                "stripe_price_id": "price_123",
                "product_type": product_type,
                "gym_id": gym.id,
                "username": "member1",
                "plan_name": "Gold"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let params = ctx.gateway.last_session_params().unwrap();
        assert_eq!(params.mode, expected);
        assert_eq!(params.price_id, "price_123");
        assert_eq!(
            params.success_url,
            "https://gym.example.com/payment/payment-success/?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(params.cancel_url, "https://gym.example.com/payment/payment-cancel/");
    }
}

#[actix_web::test]
async fn valid_promo_code_is_attached_to_session() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym = ctx.create_gym(&admin, true).await;
    ctx.gateway.add_coupon("SAVE10", true);
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/payment/")
        .insert_header(ctx.bearer(&member))
        .set_json(json!({
            "stripe_price_id": "price_123",
            "product_type": "subscription",
            "gym_id": gym.id,
            "promo_code": "SAVE10"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    assert!(body["sessionUrl"].as_str().unwrap().contains(&session_id));
    assert_eq!(
        body["successUrl"],
        format!("https://gym.example.com/payment/payment-success/?session_id={session_id}")
    );

    let params = ctx.gateway.last_session_params().unwrap();
    assert_eq!(params.coupon.as_deref(), Some("SAVE10"));

    // user_id 默认取当前登录用户, 写入 customer metadata
    let customers = ctx.gateway.customers.lock().unwrap().clone();
    let metadata = customers.get(&params.customer_id).unwrap();
    assert_eq!(metadata["user_id"], member.id.to_string());
    assert_eq!(metadata["gym_id"], gym.id.to_string());
}

#[actix_web::test]
async fn invalid_promo_code_is_rejected_before_any_session() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym = ctx.create_gym(&admin, true).await;
    ctx.gateway.add_coupon("EXPIRED", false);
    let app = test::init_service(build_app(&ctx)).await;

    for code in ["EXPIRED", "NOPE"] {
        let req = test::TestRequest::post()
            .uri("/payment/")
            .insert_header(ctx.bearer(&member))
            .set_json(json!({
                "stripe_price_id": "price_123",
                "product_type": "subscription",
                "gym_id": gym.id,
                "promo_code": code
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    assert!(
        ctx.gateway
            .calls()
            .iter()
            .all(|c| c.starts_with("retrieve_coupon:"))
    );
}

#[actix_web::test]
async fn promo_code_ignored_when_gym_has_no_offers() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/payment/")
        .insert_header(ctx.bearer(&member))
        .set_json(json!({
            "stripe_price_id": "price_123",
            "product_type": "subscription",
            "gym_id": gym.id,
            "promo_code": "WHATEVER"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(ctx.gateway.last_session_params().unwrap().coupon.is_none());
    assert!(!ctx.gateway.calls().iter().any(|c| c.starts_with("retrieve_coupon")));
}

#[actix_web::test]
async fn checkout_validates_required_fields_and_gym() {
    let ctx = TestContext::new().await;
    let member = ctx.create_user("member1", false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/payment/")
        .insert_header(ctx.bearer(&member))
        .set_json(json!({ "product_type": "subscription", "gym_id": uuid::Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/payment/")
        .insert_header(ctx.bearer(&member))
        .set_json(json!({
            "stripe_price_id": "price_123",
            "product_type": "subscription",
            "gym_id": uuid::Uuid::new_v4()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    assert!(ctx.gateway.calls().is_empty());
}
