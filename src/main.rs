use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use kidsafe::api::router::api_router;
use kidsafe::catalog;
use kidsafe::config;
use kidsafe::core_state::{CoreState, OpenAiProviderFactory};
use kidsafe::knowledge::KnowledgeBase;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        name = config::APP_NAME,
        version = config::APP_VERSION,
        "starting"
    );

    if let Err(err) = run().await {
        tracing::error!(error = %err, "fatal");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let knowledge = KnowledgeBase::load(&config::knowledge_path())?;
    let cereals = catalog::load_cereals(&config::cereal_csv_path())?;

    let core = Arc::new(CoreState::new(
        Box::new(OpenAiProviderFactory),
        knowledge,
        cereals,
    ));

    let app = api_router(core);
    let addr = format!("0.0.0.0:{}", config::DEFAULT_PORT);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
