use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, web, App, HttpServer};
use lp_common::request_log::RequestLogFactory;
use mart_engine::{MartApi, PgMartStore};

use crate::{auth::SessionKey, config::MartConfig, errors::ServerError, middleware::SessionFactory, routes};

pub fn create_server_instance(config: &MartConfig, store: PgMartStore) -> Result<Server, ServerError> {
    let key = Arc::new(SessionKey::new(&config.cookie_key));
    let srv = HttpServer::new(move || {
        let api = web::Data::new(MartApi::new(store.clone()));
        App::new()
            .wrap(RequestLogFactory)
            .app_data(api.clone())
            .app_data(web::Data::new(key.as_ref().clone()))
            .service(routes::health)
            .route("/api/user/register", web::post().to(routes::register::<PgMartStore>))
            .route("/api/user/login", web::post().to(routes::login::<PgMartStore>))
            .service(
                web::scope("/api/user")
                    .wrap(SessionFactory::new(api, Arc::clone(&key)))
                    .route("/orders", web::post().to(routes::create_order::<PgMartStore>))
                    .route("/orders", web::get().to(routes::get_orders::<PgMartStore>))
                    .route("/balance", web::get().to(routes::get_balance::<PgMartStore>))
                    .route("/balance/withdraw", web::post().to(routes::withdraw::<PgMartStore>))
                    .route("/withdrawals", web::get().to(routes::withdrawals::<PgMartStore>)),
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
