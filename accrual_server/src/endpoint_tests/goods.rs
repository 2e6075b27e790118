use actix_web::{http::StatusCode, test, web, App};

use super::mocks::MockStore;
use crate::{db::AccrualStoreError, routes, service::AccrualApi};

macro_rules! goods_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AccrualApi::new($store)))
                .route("/api/goods", web::post().to(routes::create_product_reward::<MockStore>)),
        )
        .await
    };
}

#[actix_web::test]
async fn register_rule_succeeds() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store
        .expect_create_product_reward()
        .withf(|rule| rule.matcher == "Bork" && rule.reward == 10.0 && rule.is_percent())
        .times(1)
        .returning(|_| Ok(()));
    let app = goods_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/goods")
        .set_json(serde_json::json!({"match": "Bork", "reward": 10, "reward_type": "%"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn duplicate_rule_is_a_conflict() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_create_product_reward().returning(|_| Err(AccrualStoreError::KeyExists));
    let app = goods_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/goods")
        .set_json(serde_json::json!({"match": "Bork", "reward": 10, "reward_type": "%"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn malformed_rule_body_is_rejected() {
    let _ = env_logger::try_init();
    let app = goods_app!(MockStore::new());

    let req = test::TestRequest::post()
        .uri("/api/goods")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"match\":")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn store_failure_is_a_500() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store
        .expect_create_product_reward()
        .returning(|_| Err(AccrualStoreError::Database(sqlx::Error::PoolClosed)));
    let app = goods_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/goods")
        .set_json(serde_json::json!({"match": "Bork", "reward": 10, "reward_type": "%"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
