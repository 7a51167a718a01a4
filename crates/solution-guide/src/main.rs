mod api;
mod config;
mod error;
mod generator;
mod model;
mod prompt;
mod research;
mod server;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use glean_common::glean::GleanClient;

use config::Config;
use generator::GuideGenerator;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting solution guide generator");
    info!(
        base_url = %config.glean.base_url,
        timeout_ms = config.glean.default_timeout.as_millis(),
        max_retries = config.glean.max_retries,
        research_timeout_s = config.generator.research_timeout.as_secs(),
        generation_timeout_s = config.generator.generation_timeout.as_secs(),
        debug = config.debug,
        "glean client configured"
    );

    let glean = Arc::new(GleanClient::new(config.glean.clone())?);
    let generator = Arc::new(GuideGenerator::new(
        glean.clone(),
        glean,
        config.generator.clone(),
    ));

    let probe = generator.clone();
    tokio::spawn(async move {
        let report = probe.validate_environment().await;
        if report.valid() {
            info!("glean environment validated");
        } else {
            warn!(
                configuration = report.configuration,
                glean_client = report.glean_client,
                connectivity = report.connectivity,
                "glean environment validation failed, requests may fail"
            );
        }
    });

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "HTTP server listening");
    server::serve(listener, AppState::new(generator, config.debug)).await?;
    info!("HTTP server shut down");
    Ok(())
}
