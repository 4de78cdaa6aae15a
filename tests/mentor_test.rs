mod common;

use actix_web::test;
use common::{TestContext, build_app};
use gym_backend::entities::mentor_entity as mentors;
use sea_orm::EntityTrait;
use serde_json::{Value, json};

fn mentor_body(username: &str) -> Value {
    json!({
        "username": username,
        "first_name": "Kim",
        "last_name": "Park",
        "expertise": "Strength",
        "email": format!("{username}@example.com"),
        "phone_number": "+1 555 0199",
        "password": "Coach1ngPass"
    })
}

#[actix_web::test]
async fn mentor_login_refresh_and_logout() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner", true).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/gyms/{}/mentors", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(mentor_body("kim"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].get("password_hash").is_none());
    let mentor_id: uuid::Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // 用户名全局唯一
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/gyms/{}/mentors", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(mentor_body("kim"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/login")
        .set_json(json!({ "username": "kim", "password": "Wrong1Pass" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/login")
        .set_json(json!({ "username": "kim", "password": "Coach1ngPass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["mentor"]["is_logged_in"], true);
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    // 教练令牌不能访问用户接口
    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let status = match test::try_call_service(&app, req).await {
        Ok(resp) => resp.status(),
        Err(e) => e.error_response().status(),
    };
    assert_eq!(status, 401);

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/refresh")
        .set_json(json!({ "refresh_token": refresh }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/logout")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/logout")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let row = mentors::Entity::find_by_id(mentor_id)
        .one(&ctx.pool)
        .await
        .unwrap()
        .unwrap();
    assert!(!row.is_logged_in);
}

#[actix_web::test]
async fn user_token_cannot_log_out_mentor() {
    let ctx = TestContext::new().await;
    let member = ctx.create_user("member", false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/mentors/logout")
        .insert_header(ctx.bearer(&member))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}

#[actix_web::test]
async fn weak_mentor_password_is_rejected() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner", true).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let mut body = mentor_body("lee");
    body["password"] = json!("lee12345Lee");
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/gyms/{}/mentors", gym.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn public_event_listing_spans_gyms() {
    let ctx = TestContext::new().await;
    let admin_a = ctx.create_user("owner_a", true).await;
    let admin_b = ctx.create_user("owner_b", true).await;
    let gym_a = ctx.create_gym(&admin_a, false).await;
    let gym_b = ctx.create_gym(&admin_b, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    for (admin, gym, name, date) in [
        (&admin_a, &gym_a, "Yoga Morning", "2026-11-02"),
        (&admin_b, &gym_b, "Boxing Night", "2026-11-01"),
    ] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/gyms/{}/events", gym.id))
            .insert_header(ctx.bearer(admin))
            .set_json(json!({
                "name": name,
                "date": date,
                "timing": "18:00",
                "location": "Main hall",
                "description": "Open session"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    // 不带令牌
    let req = test::TestRequest::get().uri("/api/v1/events").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["data"][0]["name"], "Boxing Night");
    assert_eq!(body["data"]["data"][1]["name"], "Yoga Morning");
}
