mod api;
mod middleware;
mod sync;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = asindb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = asindb_db::PoolConfig::from_app_config(&config);
    let pool = asindb_db::connect_pool(&config.database_url, pool_config).await?;
    asindb_db::run_migrations(&pool).await?;

    let marketplace = Arc::new(asindb_rainforest::RainforestClient::new(
        config.rainforest_api_key.clone(),
        config.marketplace,
        config.marketplace_timeout_secs,
    )?);
    if !marketplace.is_configured() {
        tracing::warn!("RAINFOREST_API_KEY not set; marketplace operations will degrade to empty");
    }

    let insight = Arc::new(asindb_insight::InsightService::new(
        config.openai_api_key.clone(),
        config.anthropic_api_key.clone(),
    )?);

    let auth = AuthState::from_env(matches!(config.env, asindb_core::Environment::Development))?;
    let app = build_app(
        AppState {
            pool,
            marketplace,
            insight,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "asindb-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
