use actix_web::{http::StatusCode, test, web, App};
use lp_common::Points;

use super::mocks::MockStore;
use crate::{
    db_types::{AccrualInfo, AccrualOrderStatus},
    routes,
    service::AccrualApi,
};

macro_rules! orders_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AccrualApi::new($store)))
                .route("/api/orders", web::post().to(routes::register_order::<MockStore>))
                .service(
                    web::resource("/api/orders/{number}").route(web::get().to(routes::accrual_info::<MockStore>)),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn register_order_is_accepted() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_order_exists().returning(|_| Ok(false));
    store
        .expect_register_order()
        .withf(|id, goods| *id == 9278923470 && goods.len() == 1 && goods[0].description == "Bork toaster")
        .times(1)
        .returning(|_, _| Ok(()));
    let app = orders_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(serde_json::json!({
            "order": "9278923470",
            "goods": [{"description": "Bork toaster", "price": 7000}]
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn known_order_is_a_conflict() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_order_exists().returning(|_| Ok(true));
    let app = orders_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(serde_json::json!({"order": "9278923470", "goods": []}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn non_numeric_order_id_is_rejected() {
    let _ = env_logger::try_init();
    let app = orders_app!(MockStore::new());

    let req = test::TestRequest::post()
        .uri("/api/orders")
        .set_json(serde_json::json!({"order": "not-a-number", "goods": []}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn status_query_returns_the_award() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_accrual_info().returning(|_| {
        Ok(Some(AccrualInfo {
            order: 9278923470,
            status: AccrualOrderStatus::Processed,
            accrual: Some(Points::from(700.0)),
        }))
    });
    let app = orders_app!(store);

    let req = test::TestRequest::get().uri("/api/orders/9278923470").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body, serde_json::json!({"order": 9278923470i64, "status": "PROCESSED", "accrual": 700.0}));
}

#[actix_web::test]
async fn status_query_omits_a_zero_award() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_accrual_info().returning(|_| {
        Ok(Some(AccrualInfo {
            order: 12345678903,
            status: AccrualOrderStatus::Processed,
            accrual: Some(Points::default()),
        }))
    });
    let app = orders_app!(store);

    let req = test::TestRequest::get().uri("/api/orders/12345678903").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body, serde_json::json!({"order": 12345678903i64, "status": "PROCESSED"}));
}

#[actix_web::test]
async fn unknown_order_is_a_204() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_accrual_info().returning(|_| Ok(None));
    let app = orders_app!(store);

    let req = test::TestRequest::get().uri("/api/orders/4561261212345467").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn non_numeric_status_query_is_rejected() {
    let _ = env_logger::try_init();
    let app = orders_app!(MockStore::new());

    let req = test::TestRequest::get().uri("/api/orders/nope").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
