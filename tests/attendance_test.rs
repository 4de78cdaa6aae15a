mod common;

use actix_web::test;
use common::{TestContext, build_app};
use gym_backend::entities::attendance_entity as attendance;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

#[actix_web::test]
async fn at_most_one_open_attendance_row() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;
    let body = json!({ "user_id": member.id, "gym_id": gym.id });

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(ctx.bearer(&member))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(ctx.bearer(&member))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let open = attendance::Entity::find()
        .filter(attendance::Column::CheckedIn.eq(true))
        .count(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(open, 1);

    // 管理员替会员签退
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-out")
        .insert_header(ctx.bearer(&admin))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let out: Value = test::read_body_json(resp).await;
    assert_eq!(out["data"]["checked_in"], false);
    assert!(out["data"]["check_out_time"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-out")
        .insert_header(ctx.bearer(&member))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // 再次签到, 历史记录保留
    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(ctx.bearer(&member))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    assert_eq!(attendance::Entity::find().count(&ctx.pool).await.unwrap(), 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/attendance?gym_id={}", gym.id))
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list["data"]["total"], 2);
}

#[actix_web::test]
async fn members_cannot_check_in_others() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_user("owner1", true).await;
    let member = ctx.create_user("member1", false).await;
    let stranger = ctx.create_user("member2", false).await;
    let gym = ctx.create_gym(&admin, false).await;
    let app = test::init_service(build_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/attendance/check-in")
        .insert_header(ctx.bearer(&stranger))
        .set_json(json!({ "user_id": member.id, "gym_id": gym.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/attendance?user_id={}", member.id))
        .insert_header(ctx.bearer(&stranger))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}
