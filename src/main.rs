use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use treatymap::http::HttpServer;
use treatymap::{AtlasConfig, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Treatymap v{}", treatymap::version());
    println!("==========================================");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AtlasConfig::load(config_path.as_deref()).context("loading configuration")?;

    println!("SPARQL endpoint: {}", config.endpoint.url);
    println!("Dataset:         {}", config.dataset_path.display());
    println!();

    let session = Arc::new(Session::from_config(&config)?);

    // Load reference tables before accepting selections
    let reference = session
        .reference()
        .await
        .context("loading reference data")?;
    println!(
        "Loaded {} organizations, statistics for {} countries",
        reference.membership_sizes.len(),
        reference.statistics.len()
    );

    let server = HttpServer::new(session, config.server.clone());
    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))?;

    Ok(())
}
