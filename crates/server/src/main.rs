use anyhow::Context;
use deployment::Deployment;
use server::{DeploymentImpl, routes};
use tracing::info;
use utils::log::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment still applies.
    let _ = dotenvy::dotenv();
    init_tracing("info");

    let deployment = DeploymentImpl::new().await?;
    let addr = deployment.config().bind_address();
    let app_router = routes::router(deployment);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
