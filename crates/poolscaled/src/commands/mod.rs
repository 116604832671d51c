pub mod check_config;
pub mod run;
pub mod simulate;

use std::path::Path;

use anyhow::Context;
use poolscale_core::ScalerConfig;

/// Load `path` if given, otherwise fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScalerConfig> {
    let config = match path {
        Some(path) => ScalerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScalerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
