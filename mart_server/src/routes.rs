//! Request handler definitions.
//!
//! Handlers are generic over the store so the endpoint tests can drive the
//! real routing table against a mock backend. Each handler maps the service
//! layer's sentinel errors onto the status table of the public contract;
//! anything unrecognized is logged and answered with a generic 500.

use actix_web::{get, http::StatusCode, web, HttpMessage, HttpRequest, HttpResponse, Responder};
use log::{error, trace};
use lp_common::{luhn, Points};
use mart_engine::{
    db_types::NewWithdrawal,
    MartApi, MartApiError, MartStore, MartStoreError,
};

use crate::{
    auth::{AuthenticatedUser, SessionKey},
    data_objects::{error_response, message_response, Credentials},
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("🛍️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Auth    ----------------------------------------------------
/// `POST /api/user/register`: create a user and start a session.
pub async fn register<B>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<MartApi<B>>,
    key: web::Data<SessionKey>,
) -> HttpResponse
where
    B: MartStore,
{
    let credentials = match decode_credentials(&req, &body) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };
    if credentials.login.is_empty() || credentials.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "login and password are required");
    }
    match api.register_user(&credentials.login, &credentials.password).await {
        Ok(user) => session_started(&key, user.id),
        Err(MartApiError::LoginInUse) => error_response(StatusCode::CONFLICT, "login already taken"),
        Err(MartApiError::MissingCredentials) => {
            error_response(StatusCode::BAD_REQUEST, "login and password are required")
        },
        Err(e) => internal_error("register", e),
    }
}

/// `POST /api/user/login`: authenticate and start a session.
pub async fn login<B>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<MartApi<B>>,
    key: web::Data<SessionKey>,
) -> HttpResponse
where
    B: MartStore,
{
    let credentials = match decode_credentials(&req, &body) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };
    if credentials.login.is_empty() || credentials.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "login and password are required");
    }
    match api.login_user(&credentials.login, &credentials.password).await {
        Ok(user) => session_started(&key, user.id),
        Err(MartApiError::InvalidCredentials) => {
            error_response(StatusCode::UNAUTHORIZED, "invalid login or password")
        },
        Err(e) => internal_error("login", e),
    }
}

/// Both register and login demand a JSON content type before touching the
/// body, as the contract promises a 400 rather than actix's default 415.
fn decode_credentials(req: &HttpRequest, body: &web::Bytes) -> Result<Credentials, HttpResponse> {
    if req.content_type() != "application/json" {
        return Err(error_response(StatusCode::BAD_REQUEST, "content-type must be application/json"));
    }
    serde_json::from_slice(body)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "invalid JSON format"))
}

fn session_started(key: &SessionKey, user_id: i64) -> HttpResponse {
    match key.session_cookie(user_id) {
        Ok(cookie) => HttpResponse::Ok().cookie(cookie).finish(),
        Err(e) => {
            error!("🛍️ Could not seal a session for user #{user_id}: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        },
    }
}

// ----------------------------------------------   Orders  ----------------------------------------------------
/// `POST /api/user/orders`: submit an order number (plain-text body).
pub async fn create_order<B>(user: AuthenticatedUser, body: web::Bytes, api: web::Data<MartApi<B>>) -> HttpResponse
where B: MartStore {
    let Ok(body) = String::from_utf8(body.to_vec()) else {
        return error_response(StatusCode::BAD_REQUEST, "order number is required");
    };
    let number = body.trim();
    trace!("🛍️ User #{} submitted order number [{number}]", user.0);
    if number.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "order number is required");
    }
    if !luhn::valid(number) {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "invalid order number");
    }
    match api.create_order(user.0, number).await {
        Ok(()) => message_response(StatusCode::ACCEPTED, "order accepted for processing"),
        Err(MartApiError::Store(MartStoreError::DuplicateOrder)) => {
            message_response(StatusCode::OK, "order already uploaded")
        },
        Err(MartApiError::Store(MartStoreError::OtherUserOrder)) => {
            error_response(StatusCode::CONFLICT, "order already uploaded by another user")
        },
        Err(e) => internal_error("create_order", e),
    }
}

/// `GET /api/user/orders`: the user's orders, newest first. An empty list is
/// still a 200.
pub async fn get_orders<B>(user: AuthenticatedUser, api: web::Data<MartApi<B>>) -> HttpResponse
where B: MartStore {
    match api.orders(user.0).await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => internal_error("get_orders", e),
    }
}

// ----------------------------------------------   Balance  ---------------------------------------------------
/// `GET /api/user/balance`: current and withdrawn totals.
pub async fn get_balance<B>(user: AuthenticatedUser, api: web::Data<MartApi<B>>) -> HttpResponse
where B: MartStore {
    match api.balance(user.0).await {
        Ok(balance) => HttpResponse::Ok().json(balance),
        Err(e) => internal_error("get_balance", e),
    }
}

/// `POST /api/user/balance/withdraw`: debit points against an order number.
pub async fn withdraw<B>(
    req: HttpRequest,
    user: AuthenticatedUser,
    body: web::Bytes,
    api: web::Data<MartApi<B>>,
) -> HttpResponse
where
    B: MartStore,
{
    if req.content_type() != "application/json" {
        return error_response(StatusCode::BAD_REQUEST, "content-type must be application/json");
    }
    let Ok(withdrawal) = serde_json::from_slice::<NewWithdrawal>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid JSON format");
    };
    trace!("🛍️ User #{} requested a withdrawal of {} against [{}]", user.0, withdrawal.sum, withdrawal.order);
    if withdrawal.sum <= Points::default() {
        return error_response(StatusCode::BAD_REQUEST, "sum must be positive");
    }
    if !luhn::valid(&withdrawal.order) {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "invalid order number");
    }
    match api.withdraw(user.0, &withdrawal).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({})),
        Err(MartApiError::Store(MartStoreError::LackOfFunds)) => {
            error_response(StatusCode::PAYMENT_REQUIRED, "lack of funds")
        },
        Err(e) => internal_error("withdraw", e),
    }
}

/// `GET /api/user/withdrawals`: the withdrawal ledger, newest first. An
/// empty ledger is a 204.
pub async fn withdrawals<B>(user: AuthenticatedUser, api: web::Data<MartApi<B>>) -> HttpResponse
where B: MartStore {
    match api.withdrawals(user.0).await {
        Ok(rows) if rows.is_empty() => HttpResponse::NoContent().finish(),
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => internal_error("withdrawals", e),
    }
}

fn internal_error(operation: &str, e: MartApiError) -> HttpResponse {
    error!("🛍️ {operation} failed: {e}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
