mod common;

use actix_web::test;
use common::{TestContext, build_app};
use gym_backend::entities::{PaymentStatus, payment_entity as payments};
use sea_orm::EntityTrait;
use serde_json::{Value, json};

fn manual_payment(gym_id: uuid::Uuid, key: Option<&str>) -> Value {
    json!({
        "gym_id": gym_id,
        "username": "walkin",
        "first_name": "Walk",
        "last_name": "In",
        "plan_name": "Day Pass",
        "amount_cents": 0,
        "status": "failed",
        "stripe_payment_id": key
    })
}

#[actix_web::test]
async fn manual_entry_cannot_overwrite_existing_payment() {
    let ctx = TestContext::new().await;
    let admin_a = ctx.create_user("owner_a", true).await;
    let admin_b = ctx.create_user("owner_b", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym_a = ctx.create_gym(&admin_a, false).await;
    let gym_b = ctx.create_gym(&admin_b, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    // 会员在 A 馆完成支付
    let req = test::TestRequest::post()
        .uri("/payment/")
        .insert_header(ctx.bearer(&member))
        .set_json(json!({
            "stripe_price_id": "price_123",
            "product_type": "supplement",
            "gym_id": gym_a.id,
            "username": "member1",
            "plan_name": "Protein"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    let pi = ctx.gateway.sessions.lock().unwrap()[&session_id]
        .payment_intent_id
        .clone()
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/payment/payment-success/?session_id={session_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    // B 馆管理员用同一个 payment intent 手工录入
    let req = test::TestRequest::post()
        .uri("/payment/details/")
        .insert_header(ctx.bearer(&admin_b))
        .set_json(manual_payment(gym_b.id, Some(&pi)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    // A 馆管理员自己也不能改写
    let req = test::TestRequest::post()
        .uri("/payment/details/")
        .insert_header(ctx.bearer(&admin_a))
        .set_json(manual_payment(gym_a.id, Some(&pi)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let rows = payments::Entity::find().all(&ctx.pool).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].gym_id, gym_a.id);
    assert_eq!(rows[0].amount_cents, 4900);
    assert_eq!(rows[0].status, PaymentStatus::Succeeded);
}

#[actix_web::test]
async fn manual_entry_without_key_gets_generated_key() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner_a", true).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/payment/details/")
            .insert_header(ctx.bearer(&admin))
            .set_json(manual_payment(gym.id, None))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["data"]["stripe_payment_id"].as_str().unwrap().starts_with("manual_"));
    }

    assert_eq!(payments::Entity::find().all(&ctx.pool).await.unwrap().len(), 2);
}
