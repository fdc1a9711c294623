use std::sync::Arc;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::{ConfigLoader, ServerSettings};
use payroll_engine::payroll::InMemoryPayrollStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ServerSettings::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("payroll_engine=info")),
        )
        .with_target(false)
        .init();

    let config = ConfigLoader::load(&settings.config_dir)?;
    info!(
        config_dir = %settings.config_dir.display(),
        tax_years = ?config.config().tax_years(),
        "Rate tables loaded"
    );

    let state = AppState::new(config, Arc::new(InMemoryPayrollStore::new()));
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!(bind_addr = %settings.bind_addr, "Payroll engine listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
