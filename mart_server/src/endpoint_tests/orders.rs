use actix_web::{http::StatusCode, test::TestRequest};
use lp_common::Points;
use mart_engine::{
    db_types::{MartOrder, OrderStatus},
    MartStoreError,
};

use super::{
    helpers::{auth_cookie, call, test_user},
    mocks::MockStore,
};

fn authed_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_user_by_id().returning(|id| Ok(Some(test_user(id))));
    store
}

#[actix_web::test]
async fn submitting_requires_a_session() {
    let req = TestRequest::post().uri("/api/user/orders").set_payload("9278923470").to_request();
    let reply = call(MockStore::new(), req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"], "authentication required");
}

#[actix_web::test]
async fn a_garbage_cookie_is_rejected() {
    let req = TestRequest::post()
        .uri("/api/user/orders")
        .cookie(actix_web::cookie::Cookie::new("userID", "AAAA"))
        .set_payload("9278923470")
        .to_request();
    let reply = call(MockStore::new(), req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"], "invalid authentication cookie");
}

#[actix_web::test]
async fn a_session_for_a_deleted_user_is_rejected() {
    let mut store = MockStore::new();
    store.expect_fetch_user_by_id().returning(|_| Ok(None));
    let req = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(9)).set_payload("9278923470").to_request();
    let reply = call(store, req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"], "user not found");
}

#[actix_web::test]
async fn a_new_number_is_accepted() {
    let mut store = authed_store();
    store
        .expect_create_order()
        .withf(|user_id, number| *user_id == 7 && number == "9278923470")
        .times(1)
        .returning(|_, _| Ok(()));
    let req = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("9278923470").to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert_eq!(reply.json()["message"], "order accepted for processing");
}

#[actix_web::test]
async fn resubmitting_your_own_number_is_a_200() {
    let mut store = authed_store();
    store.expect_create_order().returning(|_, _| Err(MartStoreError::DuplicateOrder));
    let req = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("9278923470").to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["message"], "order already uploaded");
}

#[actix_web::test]
async fn someone_elses_number_is_a_conflict() {
    let mut store = authed_store();
    store.expect_create_order().returning(|_, _| Err(MartStoreError::OtherUserOrder));
    let req = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("9278923470").to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.json()["error"], "order already uploaded by another user");
}

#[actix_web::test]
async fn a_luhn_invalid_number_is_rejected_without_a_store_call() {
    // No create_order expectation: the mock panics if the handler reaches the store.
    let req = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("1234567890").to_request();
    let reply = call(authed_store(), req).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.json()["error"], "invalid order number");
}

#[actix_web::test]
async fn an_empty_body_is_rejected() {
    let req = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("  \n").to_request();
    let reply = call(authed_store(), req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "order number is required");
}

#[actix_web::test]
async fn listing_orders_returns_an_empty_array() {
    let mut store = authed_store();
    store.expect_fetch_orders().returning(|_| Ok(vec![]));
    let req = TestRequest::get().uri("/api/user/orders").cookie(auth_cookie(7)).to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), serde_json::json!([]));
}

#[actix_web::test]
async fn listing_orders_returns_the_contractual_fields() {
    let mut store = authed_store();
    store.expect_fetch_orders().returning(|_| {
        Ok(vec![
            MartOrder {
                uid: 2,
                user_id: 7,
                number: "9278923470".into(),
                status: OrderStatus::Processed,
                accrual: Some(Points::from(700.0)),
                uploaded_at: "2026-08-02T10:15:00Z".parse().unwrap(),
            },
            MartOrder {
                uid: 1,
                user_id: 7,
                number: "12345678903".into(),
                status: OrderStatus::New,
                accrual: None,
                uploaded_at: "2026-08-01T09:00:00Z".parse().unwrap(),
            },
        ])
    });
    let req = TestRequest::get().uri("/api/user/orders").cookie(auth_cookie(7)).to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        serde_json::json!([
            {
                "number": "9278923470",
                "status": "PROCESSED",
                "accrual": 700.0,
                "uploaded_at": "2026-08-02T10:15:00Z"
            },
            {
                "number": "12345678903",
                "status": "NEW",
                "uploaded_at": "2026-08-01T09:00:00Z"
            }
        ])
    );
}
