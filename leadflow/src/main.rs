//! Campaign API server.

use std::sync::Arc;

use anyhow::{Context, Result};
use leadflow::config::Settings;
use leadflow::server::{self, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},tower_http=info")));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env().context("failed to load settings")?;
    init_tracing(&settings.log_level);

    tracing::info!(
        app = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        model = %settings.llm_model,
        "Starting campaign server"
    );

    let state = AppState::from_settings(Arc::new(settings)).context("failed to build collaborators")?;
    server::serve(state).await.context("server error")?;
    Ok(())
}
