//! Request handlers.
//!
//! Three operations: rule ingest, order ingest, status query. Handlers are
//! generic over the store so the endpoint tests drive them against a mock;
//! the JSON extractor answers malformed bodies with a 400 before a handler
//! runs.

use actix_web::{get, web, HttpResponse, Responder};
use log::{error, trace};

use crate::{
    db::AccrualStoreError,
    db_types::{NewAccrualOrder, ProductReward},
    service::{AccrualApi, AccrualApiError, AccrualStore},
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Goods   ----------------------------------------------------
/// `POST /api/goods`: register a reward rule. 409 when the match substring
/// is already taken.
pub async fn create_product_reward<B>(
    api: web::Data<AccrualApi<B>>,
    rule: web::Json<ProductReward>,
) -> HttpResponse
where
    B: AccrualStore,
{
    trace!("💻️ Received reward rule for [{}]", rule.matcher);
    match api.create_product_reward(&rule).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(AccrualApiError::Store(AccrualStoreError::KeyExists)) => HttpResponse::Conflict().finish(),
        Err(e) => {
            error!("💻️ Could not register reward rule [{}]: {e}", rule.matcher);
            HttpResponse::InternalServerError().finish()
        },
    }
}

// ----------------------------------------------   Orders  ----------------------------------------------------
/// `POST /api/orders`: register an order for processing. 202 on acceptance,
/// 409 when the id is already known, 400 when the id is not numeric.
pub async fn register_order<B>(api: web::Data<AccrualApi<B>>, order: web::Json<NewAccrualOrder>) -> HttpResponse
where B: AccrualStore {
    trace!("💻️ Received order [{}] with {} goods lines", order.order, order.goods.len());
    match api.register_order(&order).await {
        Ok(false) => HttpResponse::Accepted().finish(),
        Ok(true) => HttpResponse::Conflict().finish(),
        Err(AccrualApiError::BadOrderNumber(_)) => HttpResponse::BadRequest().finish(),
        Err(e) => {
            error!("💻️ Could not register order [{}]: {e}", order.order);
            HttpResponse::InternalServerError().finish()
        },
    }
}

/// `GET /api/orders/{number}`: status and award for one order. 204 when the
/// order is unknown, 400 when the path parameter is not numeric.
pub async fn accrual_info<B>(api: web::Data<AccrualApi<B>>, path: web::Path<String>) -> HttpResponse
where B: AccrualStore {
    let Ok(order_id) = path.parse::<i64>() else {
        return HttpResponse::BadRequest().finish();
    };
    match api.accrual_info(order_id).await {
        Ok(Some(info)) => HttpResponse::Ok().json(info),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => {
            error!("💻️ Could not fetch accrual info for [{order_id}]: {e}");
            HttpResponse::InternalServerError().finish()
        },
    }
}
