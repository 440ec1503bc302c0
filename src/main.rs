use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use tradechat_backend::config::Settings;
use tradechat_backend::core::logging;
use tradechat_backend::server::router;
use tradechat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    logging::init(&settings.log_dir);

    let port = settings.port;
    let state = AppState::initialize(settings).await?;

    let bind_addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
