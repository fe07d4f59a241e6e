mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vastgoed_analysis::{BatchScheduler, GeminiSummarizer, SummarizerSettings};
use vastgoed_providers::{ProviderClient, ProviderSettings};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = vastgoed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        env = ?config.env,
        sandbox = config.use_sandbox,
        "starting vastgoed server"
    );

    let source = ProviderClient::new(ProviderSettings::from_app_config(&config))?;
    let summarizer = GeminiSummarizer::new(SummarizerSettings::from_app_config(&config))?;
    let summarizer_configured = config.gemini_api_key.is_some();
    if !summarizer_configured {
        tracing::warn!("GEMINI_API_KEY not set; every report will be the fallback report");
    }

    let state = AppState {
        source: Arc::new(source),
        summarizer: Arc::new(summarizer),
        scheduler: BatchScheduler::from_app_config(&config),
        summarizer_configured,
    };
    let auth = AuthState::from_env(matches!(
        config.env,
        vastgoed_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
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
