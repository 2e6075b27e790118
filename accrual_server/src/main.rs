use accrual_server::{
    config::AccrualConfig,
    db,
    db::PgAccrualStore,
    matcher::start_matcher,
    server::{create_server_instance, shutdown_signal},
    service::AccrualApi,
};
use dotenvy::dotenv;
use log::{error, info};
use tokio_util::sync::CancellationToken;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    let _log = lp_common::logging::init("accrual");
    let config = AccrualConfig::load();

    let pool = match db::new_pool(&config.database_url, 25).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("🚀️ Postgres is unavailable: {e}");
            std::process::exit(1);
        },
    };
    if let Err(e) = db::run_migrations(&pool).await {
        error!("🚀️ Migration failed: {e}");
        std::process::exit(1);
    }

    let store = PgAccrualStore::new(pool);
    let shutdown = CancellationToken::new();
    let matcher = start_matcher(AccrualApi::new(store.clone()), config.polling_interval, shutdown.clone());

    let server = match create_server_instance(&config, store) {
        Ok(srv) => srv,
        Err(e) => {
            error!("🚀️ Could not start the server: {e}");
            std::process::exit(1);
        },
    };
    let server_handle = server.handle();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("🚀️ Shutting down...");
            shutdown.cancel();
            server_handle.stop(true).await;
        });
    }

    info!("🚀️ Accrual service listening on {}", config.run_address);
    if let Err(e) = server.await {
        error!("🚀️ Server error: {e}");
    }
    shutdown.cancel();
    let _ = matcher.await;
    info!("🚀️ Accrual service stopped");
}
