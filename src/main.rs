//! Artist timeline service: binary entrypoint.
//! Loads config, starts the background refresher and serves the HTTP API.

use anyhow::Context;
use artist_timeline::{build_service, create_router, init_tracing, spawn_scheduler, TimelineConfig};
use artist_timeline::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TimelineConfig::load()?;
    let metrics = Metrics::init()?;
    let service = build_service(&cfg).await?;

    let scheduler = spawn_scheduler(service.clone(), cfg.tick());

    let app = create_router(service).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, tick_secs = cfg.refresh.interval_secs, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("http server")?;

    scheduler.abort();
    Ok(())
}
