use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, web, App, HttpServer};
use lp_common::request_log::RequestLogFactory;

use crate::{
    config::AccrualConfig,
    db::PgAccrualStore,
    errors::ServerError,
    middleware::{RateLimitFactory, RateLimiter},
    routes,
    service::AccrualApi,
};

pub fn create_server_instance(config: &AccrualConfig, store: PgAccrualStore) -> Result<Server, ServerError> {
    // One limiter for the whole server; workers share the window.
    let limiter = Arc::new(RateLimiter::new(config.max_requests, config.window));
    let srv = HttpServer::new(move || {
        let api = AccrualApi::new(store.clone());
        App::new()
            .wrap(RequestLogFactory)
            .app_data(web::Data::new(api))
            .service(routes::health)
            .route("/api/goods", web::post().to(routes::create_product_reward::<PgAccrualStore>))
            .route("/api/orders", web::post().to(routes::register_order::<PgAccrualStore>))
            .service(
                web::resource("/api/orders/{number}")
                    .wrap(RateLimitFactory::new(Arc::clone(&limiter)))
                    .route(web::get().to(routes::accrual_info::<PgAccrualStore>)),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .shutdown_timeout(5)
    .disable_signals()
    .bind(config.run_address.as_str())?
    .run();
    Ok(srv)
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            },
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            },
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
