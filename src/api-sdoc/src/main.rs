use anyhow::Context;
use core_sdoc::{Pipeline, Settings, setup_logging};

use api_sdoc::{AppState, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    setup_logging("api_sdoc=debug,core_sdoc=info,tower_http=debug");

    let settings = Settings::from_env()?;
    let pipeline = Pipeline::from_settings(&settings)?;
    let app = routes::router(&settings.api_v1_str).with_state(AppState::new(pipeline, &settings.project_name));

    let addr = settings.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    tracing::info!("{} listening on http://{}", settings.project_name, addr);

    axum::serve(listener, app).await?;
    Ok(())
}
