mod common;

use actix_web::test;
use common::{TestContext, build_app};
use gym_backend::entities::gym_entity as gyms;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

fn gym_body(name: &str) -> Value {
    json!({
        "gym_name": name,
        "owner_first_name": "Ada",
        "owner_last_name": "Stone",
        "address": "1 Main St",
        "phone_number": "+1 555 0100",
        "email": "owner@example.com",
        "promo_code_offers": true
    })
}

#[actix_web::test]
async fn one_gym_per_admin() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/gyms")
        .insert_header(ctx.bearer(&admin))
        .set_json(gym_body("Iron Works"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/v1/gyms")
        .insert_header(ctx.bearer(&admin))
        .set_json(gym_body("Second Gym"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/gyms")
        .insert_header(ctx.bearer(&member))
        .set_json(gym_body("Member Gym"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    assert_eq!(gyms::Entity::find().count(&ctx.pool).await.unwrap(), 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/gyms/mine")
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["gym_name"], "Iron Works");
}

#[actix_web::test]
async fn stripe_connect_callback_binds_account_once() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/gyms/stripe/callback?code=ac_123")
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let stored = gyms::Entity::find_by_id(gym.id).one(&ctx.pool).await.unwrap().unwrap();
    assert_eq!(stored.stripe_account_id.as_deref(), Some("acct_ac_123"));

    let req = test::TestRequest::get()
        .uri("/api/v1/gyms/stripe/callback?code=ac_456")
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn plan_price_change_creates_new_price_and_archives_old() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let other_admin = ctx.create_user("owner2", true).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/gyms/{}/plans", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({
            "plan_name": "Gold",
            "description": "Unlimited access",
            "price_cents": 4900,
            "interval": "month"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let plan_id = body["data"]["id"].as_str().unwrap().to_string();
    let old_price = body["data"]["stripe_price_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["interval_count"], 1);

    // 只改描述: 更新 product, 不动 price
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/gyms/{}/plans/{plan_id}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({ "description": "Unlimited access, all hours" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["stripe_price_id"], old_price.as_str());
    assert!(ctx.gateway.calls().iter().any(|c| c.starts_with("update_product:")));
    assert!(!ctx.gateway.calls().iter().any(|c| c.starts_with("archive_price:")));

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/gyms/{}/plans/{plan_id}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({ "price_cents": 5900 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let new_price = body["data"]["stripe_price_id"].as_str().unwrap().to_string();
    assert_ne!(new_price, old_price);
    assert_eq!(body["data"]["price_cents"], 5900);
    assert!(ctx.gateway.calls().contains(&format!("archive_price:{old_price}")));

    // 其他管理员不能修改
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/gyms/{}/plans/{plan_id}", gym.id))
        .insert_header(ctx.bearer(&other_admin))
        .set_json(json!({ "price_cents": 100 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/gyms/{}/plans", gym.id))
        .insert_header(ctx.bearer(&other_admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn product_crud_mirrors_provider() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/gyms/{}/products", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({
            "name": "Whey",
            "product_type": "supplement",
            "description": "2kg tub",
            "stock": 10,
            "price_cents": 3500
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let product_id = body["data"]["id"].as_str().unwrap().to_string();
    let price_id = body["data"]["stripe_price_id"].as_str().unwrap().to_string();

    // 价格非法时不能先改 Stripe 上的 product
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/gyms/{}/products/{product_id}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({ "name": "Whey Gold", "price_cents": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert!(!ctx.gateway.calls().iter().any(|c| c.starts_with("update_product:")));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/gyms/{}/products/{product_id}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["name"], "Whey");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/gyms/{}/products/{product_id}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
    assert!(ctx.gateway.calls().contains(&format!("archive_price:{price_id}")));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/gyms/{}/products/{product_id}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
