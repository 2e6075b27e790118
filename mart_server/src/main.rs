use dotenvy::dotenv;
use log::{error, info};
use mart_engine::{
    db,
    pipeline::{start_order_pipeline, AccrualClient},
    PgMartStore,
};
use mart_server::{
    config::MartConfig,
    server::{create_server_instance, shutdown_signal},
};
use tokio_util::sync::CancellationToken;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    let _log = lp_common::logging::init("mart");
    let config = MartConfig::load();

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

    let shutdown = CancellationToken::new();
    let client = AccrualClient::new(&config.accrual_address);
    let (replayer, notifier) =
        start_order_pipeline(config.database_url.clone(), pool.clone(), client, shutdown.clone());

    let store = PgMartStore::new(pool);
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

    info!("🚀️ Mart service listening on {}, accrual at {}", config.run_address, config.accrual_address);
    if let Err(e) = server.await {
        error!("🚀️ Server error: {e}");
    }
    shutdown.cancel();
    let _ = replayer.await;
    let _ = notifier.await;
    info!("🚀️ Mart service stopped");
}
