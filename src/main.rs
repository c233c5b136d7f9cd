//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use user_api::auth::TokenCodec;
use user_api::config::{AppMode, Config, SERVICE_NAME};
use user_api::db;
use user_api::repositories::PgUserRepository;
use user_api::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    let registry = tracing_subscriber::registry().with(filter);
    if config.mode == AppMode::Release {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::debug!(?config, "configuration loaded");

    let pool = db::create_pool(
        &config.database_url(),
        config.db_max_connections,
        config.db_min_connections,
    )
    .await?;
    db::run_migrations(&pool).await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "database ready"
    );

    let users = Arc::new(PgUserRepository::new(pool));
    let tokens = TokenCodec::new(config.jwt_secret.clone(), SERVICE_NAME, config.token_ttl());
    let app = create_app(AppState::new(users, tokens));

    let addr = config.server_addr();
    tracing::info!(%addr, mode = ?config.mode, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
