//! `stockbridge` — one-shot ERP → NetBox inventory sync.

use anyhow::Context;

use stockbridge_core::SyncConfig;
use stockbridge_reconciler::{NetboxClient, Reconciler};
use stockbridge_source::{InventorySource, OdooClient};

#[tokio::main]
async fn main() {
    stockbridge_observability::init();

    if let Err(err) = run().await {
        tracing::error!(error = %format!("{err:#}"), "sync aborted");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| {
        std::env::var("STOCKBRIDGE_CONFIG").unwrap_or_else(|_| {
            tracing::warn!("no config path given; falling back to ./stockbridge.json");
            "stockbridge.json".to_string()
        })
    });

    let config = SyncConfig::load(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;

    // Read side: the full item list is produced up front. Authentication
    // or listing failures abort here, before anything is written.
    let source = InventorySource::new(OdooClient::new(config.erp.clone()), &config);
    let inventory = source
        .fetch_by_brand()
        .await
        .context("fetching inventory from the ERP")?;

    // Write side: per-item failures are tallied inside the run, not
    // propagated.
    let reconciler = Reconciler::new(NetboxClient::new(&config.netbox), &config);
    let summary = reconciler.run(&inventory).await;

    tracing::info!(
        processed = summary.processed,
        created = summary.created_devices,
        existing = summary.existing_devices,
        skipped = summary.skipped,
        failed = summary.failed,
        "sync complete"
    );
    Ok(())
}
