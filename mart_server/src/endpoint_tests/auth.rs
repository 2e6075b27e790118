use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest};
use mart_engine::MartStoreError;

use super::{
    helpers::{call, test_key, test_user},
    mocks::MockStore,
};
use crate::auth::SESSION_COOKIE;

#[actix_web::test]
async fn register_issues_a_session_cookie() {
    let mut store = MockStore::new();
    store
        .expect_create_user()
        .withf(|login, password| login == "u" && password == "p")
        .returning(|_, _| Ok(test_user(7)));
    let req = TestRequest::post()
        .uri("/api/user/register")
        .set_json(serde_json::json!({"login": "u", "password": "p"}))
        .to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::OK);
    let set_cookie = reply.set_cookie.expect("No session cookie issued");
    let cookie = Cookie::parse(set_cookie).unwrap();
    assert_eq!(cookie.name(), SESSION_COOKIE);
    assert_eq!(test_key().open(cookie.value()).unwrap(), 7);
}

#[actix_web::test]
async fn register_rejects_a_taken_login() {
    let mut store = MockStore::new();
    store.expect_create_user().returning(|_, _| Err(MartStoreError::LoginExists));
    let req = TestRequest::post()
        .uri("/api/user/register")
        .set_json(serde_json::json!({"login": "u", "password": "p"}))
        .to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.json()["error"], "login already taken");
}

#[actix_web::test]
async fn register_demands_json() {
    let req = TestRequest::post()
        .uri("/api/user/register")
        .insert_header(("content-type", "text/plain"))
        .set_payload(r#"{"login":"u","password":"p"}"#)
        .to_request();
    let reply = call(MockStore::new(), req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_rejects_malformed_json() {
    let req = TestRequest::post()
        .uri("/api/user/register")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"login":"#)
        .to_request();
    let reply = call(MockStore::new(), req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "invalid JSON format");
}

#[actix_web::test]
async fn register_rejects_empty_credentials() {
    let req = TestRequest::post()
        .uri("/api/user/register")
        .set_json(serde_json::json!({"login": "", "password": "p"}))
        .to_request();
    let reply = call(MockStore::new(), req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "login and password are required");
}

#[actix_web::test]
async fn login_issues_a_session_cookie() {
    let mut store = MockStore::new();
    store.expect_fetch_user_by_credentials().returning(|_, _| Ok(Some(test_user(3))));
    let req = TestRequest::post()
        .uri("/api/user/login")
        .set_json(serde_json::json!({"login": "u", "password": "p"}))
        .to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::OK);
    let cookie = Cookie::parse(reply.set_cookie.expect("No session cookie issued")).unwrap();
    assert_eq!(test_key().open(cookie.value()).unwrap(), 3);
}

#[actix_web::test]
async fn login_rejects_bad_credentials() {
    let mut store = MockStore::new();
    store.expect_fetch_user_by_credentials().returning(|_, _| Ok(None));
    let req = TestRequest::post()
        .uri("/api/user/login")
        .set_json(serde_json::json!({"login": "u", "password": "wrong"}))
        .to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"], "invalid login or password");
    assert!(reply.set_cookie.is_none());
}

#[actix_web::test]
async fn login_maps_store_failures_to_500() {
    let mut store = MockStore::new();
    store
        .expect_fetch_user_by_credentials()
        .returning(|_, _| Err(MartStoreError::Database(sqlx::Error::PoolClosed)));
    let req = TestRequest::post()
        .uri("/api/user/login")
        .set_json(serde_json::json!({"login": "u", "password": "p"}))
        .to_request();

    let reply = call(store, req).await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json()["error"], "internal server error");
}
