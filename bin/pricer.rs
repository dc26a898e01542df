use std::{io::Write, sync::Arc};

use anyhow::{anyhow, Context};
use log::info;
use simple_logger::SimpleLogger;

use pricer::{replay_snapshot, PriceResolver, Settings, Snapshot};

fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load config. Please ensure it is valid")?;

    SimpleLogger::new()
        .with_level(settings.logging.level_filter()?)
        .init()
        .context("Failed to initialize logger")?;

    let pricing = settings
        .pricing
        .build()
        .context("Invalid pricing configuration")?;

    info!(
        "Base token {}, reference pool {}, {} whitelisted tokens",
        pricing.base_token,
        pricing.reference_pool,
        pricing.whitelist.len()
    );

    // First CLI argument overrides snapshot.path
    let snapshot_path = std::env::args()
        .nth(1)
        .or_else(|| settings.snapshot.path.clone())
        .ok_or_else(|| anyhow!("No snapshot given. Pass a path or set snapshot.path"))?;

    let snapshot = Snapshot::from_json_file(&snapshot_path)?;
    info!(
        "Loaded snapshot {} ({} tokens, {} pairs)",
        snapshot_path,
        snapshot.tokens.len(),
        snapshot.pairs.len()
    );

    let resolver = PriceResolver::new(Arc::new(pricing));
    let report = replay_snapshot(&resolver, snapshot).rounded();

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("Failed to write report")?;
    writeln!(stdout)?;

    Ok(())
}
