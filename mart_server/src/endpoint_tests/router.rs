//! Routing-table tests: the right handlers on the right methods, and the
//! full submit-twice flow across a single app instance.

use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{http::StatusCode, test::TestRequest};
use mart_engine::MartStoreError;

use super::{
    helpers::{auth_cookie, call, call_sequence, test_user},
    mocks::MockStore,
};

#[actix_web::test]
async fn health_answers_without_a_session() {
    let reply = call(MockStore::new(), TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[actix_web::test]
async fn unknown_paths_are_still_guarded_by_the_session_scope() {
    // Inside the /api/user scope the middleware answers before routing does.
    let reply = call(MockStore::new(), TestRequest::get().uri("/api/user/nope").to_request()).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_cookie_from_register_opens_the_authenticated_scope() {
    use actix_web::cookie::Cookie;
    use lp_common::Points;
    use mart_engine::db_types::Balance;

    let mut store = MockStore::new();
    store.expect_create_user().returning(|_, _| Ok(test_user(11)));
    store.expect_fetch_user_by_id().returning(|id| Ok(Some(test_user(id))));
    store
        .expect_fetch_balance()
        .withf(|user_id| *user_id == 11)
        .returning(|_| Ok(Balance { current: Points::from(700.0), withdrawn: Points::default() }));

    let register = TestRequest::post()
        .uri("/api/user/register")
        .set_json(serde_json::json!({"login": "u", "password": "p"}))
        .to_request();
    let replies = call_sequence(store, vec![register]).await;
    let issued = Cookie::parse(replies[0].set_cookie.clone().expect("No session cookie issued")).unwrap();

    // The freshly issued cookie must authenticate a balance query for the
    // same user without any further ceremony.
    let mut store = MockStore::new();
    store.expect_fetch_user_by_id().returning(|id| Ok(Some(test_user(id))));
    store
        .expect_fetch_balance()
        .withf(|user_id| *user_id == 11)
        .returning(|_| Ok(Balance { current: Points::from(700.0), withdrawn: Points::default() }));
    let balance = TestRequest::get().uri("/api/user/balance").cookie(issued.into_owned()).to_request();
    let reply = call(store, balance).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), serde_json::json!({"current": 700.0, "withdrawn": 0.0}));
}

#[actix_web::test]
async fn submitting_the_same_number_twice_is_202_then_200() {
    let mut store = MockStore::new();
    store.expect_fetch_user_by_id().returning(|id| Ok(Some(test_user(id))));
    let calls = AtomicUsize::new(0);
    store.expect_create_order().times(2).returning(move |_, _| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(())
        } else {
            Err(MartStoreError::DuplicateOrder)
        }
    });

    let first = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("9278923470").to_request();
    let second =
        TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(7)).set_payload("9278923470").to_request();
    let replies = call_sequence(store, vec![first, second]).await;

    assert_eq!(replies[0].status, StatusCode::ACCEPTED);
    assert_eq!(replies[1].status, StatusCode::OK);
    assert_eq!(replies[1].json()["message"], "order already uploaded");
}

#[actix_web::test]
async fn a_second_user_submitting_the_number_is_rejected() {
    let mut store = MockStore::new();
    store.expect_fetch_user_by_id().returning(|id| Ok(Some(test_user(id))));
    store.expect_create_order().withf(|user_id, _| *user_id == 1).returning(|_, _| Ok(()));
    store
        .expect_create_order()
        .withf(|user_id, _| *user_id == 2)
        .returning(|_, _| Err(MartStoreError::OtherUserOrder));

    let first = TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(1)).set_payload("9278923470").to_request();
    let second =
        TestRequest::post().uri("/api/user/orders").cookie(auth_cookie(2)).set_payload("9278923470").to_request();
    let replies = call_sequence(store, vec![first, second]).await;

    assert_eq!(replies[0].status, StatusCode::ACCEPTED);
    assert_eq!(replies[1].status, StatusCode::CONFLICT);
}
