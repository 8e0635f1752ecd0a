use anyhow::{Context, bail};

use recon_engine::{Batch, EngineConfig, replay};

fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env().context("failed to load configuration")?;
    recon_observability::init_with(config.log_format);
    tracing::debug!(
        log_format = config.log_format.as_str(),
        low_stock_alerts = config.low_stock_alerts,
        home_jurisdiction = ?config.home_jurisdiction,
        "configuration loaded"
    );

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: recon-engine <batch.json>");
    };

    let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let batch: Batch =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse batch {path}"))?;

    tracing::info!(
        %path,
        invoices = batch.invoices.len(),
        receipts = batch.receipts.len(),
        payments = batch.payments.len(),
        "replaying batch"
    );
    let report = replay(batch, config).context("batch replay failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
