use std::path::Path;

use anyhow::Context;
use poolscale_core::ScalerConfig;

pub fn check_config(path: &Path) -> anyhow::Result<()> {
    let config = ScalerConfig::from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;

    println!("✓ {} is valid", path.display());
    println!(
        "  {} idle ticks ≈ {}s grace, {} samples per utilization window\n",
        config.idle_grace_ticks,
        config.idle_grace_period()?.as_secs(),
        config.window_ticks()?
    );
    print!("{}", config.to_toml_string()?);
    Ok(())
}
