//! Carelog server binary: initialize logging, prepare the data directory
//! and database, seed the default user, then serve until ctrl-c.

use tracing_subscriber::EnvFilter;

use carelog::api::server::start_server;
use carelog::api::ApiContext;
use carelog::config;
use carelog::db::repository::ensure_default_user;
use carelog::db::sqlite::open_database;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = run().await {
        tracing::error!("Fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(config::data_dir())?;
    std::fs::create_dir_all(config::uploads_dir())?;

    // Run migrations and seed the default user before accepting requests.
    let conn = open_database(&config::db_path())?;
    let default_user = ensure_default_user(&conn)?;
    drop(conn);
    tracing::info!(user_id = %default_user.id, "default user ready");

    let ctx = ApiContext::new(config::db_path(), config::uploads_dir(), default_user.id);
    let mut server = start_server(ctx, config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "Carelog API listening");

    shutdown_signal().await;
    server.shutdown();
    server.join().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
