//! poolscale.toml configuration parser.
//!
//! Every tunable of the control loop lives here and is handed to the
//! engine at construction. Durations are kept as strings ("2m", "90s",
//! "1h") in the file and parsed on access.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// One row of the growth table: average utilization strictly inside
/// `(lower, upper)` scales the pool by `factor`. `upper = None` means
/// "anything above `lower`".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthBand {
    pub lower: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    pub factor: f64,
}

impl GrowthBand {
    pub fn bounded(lower: f64, upper: f64, factor: f64) -> Self {
        Self {
            lower,
            upper: Some(upper),
            factor,
        }
    }

    pub fn open_ended(lower: f64, factor: f64) -> Self {
        Self {
            lower,
            upper: None,
            factor,
        }
    }

    /// Both bounds are exclusive.
    pub fn contains(&self, average: f64) -> bool {
        average > self.lower && self.upper.is_none_or(|upper| average < upper)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    /// Control-loop cadence.
    pub tick_interval: String,
    /// Consecutive idle ticks a sole instance survives before it is destroyed.
    pub idle_grace_ticks: u32,
    /// Idle members of a multi-instance pool below this utilization are destroyed.
    pub destroy_utilization_threshold: f64,
    /// Trailing window over which instance utilization is measured.
    pub utilization_window: String,
    /// Evaluated in order; the first matching band wins.
    pub growth_bands: Vec<GrowthBand>,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            tick_interval: "2m".to_string(),
            idle_grace_ticks: 30,
            destroy_utilization_threshold: 0.20,
            utilization_window: "1h".to_string(),
            growth_bands: vec![
                GrowthBand::bounded(0.60, 0.69, 1.20),
                GrowthBand::bounded(0.70, 0.79, 1.40),
                GrowthBand::bounded(0.80, 0.90, 1.60),
                GrowthBand::open_ended(0.90, 1.80),
            ],
        }
    }
}

impl ScalerConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ScalerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn tick_interval(&self) -> ConfigResult<Duration> {
        parse_duration(&self.tick_interval)
    }

    pub fn utilization_window(&self) -> ConfigResult<Duration> {
        parse_duration(&self.utilization_window)
    }

    /// Number of ticks that fit in the utilization window (30 at defaults).
    pub fn window_ticks(&self) -> ConfigResult<u32> {
        let tick = self.tick_interval()?.as_secs();
        let window = self.utilization_window()?.as_secs();
        if tick == 0 {
            return Err(ConfigError::Invalid("tick_interval must be non-zero".into()));
        }
        Ok((window / tick).max(1) as u32)
    }

    /// Wall-clock time a sole idle instance is kept alive.
    pub fn idle_grace_period(&self) -> ConfigResult<Duration> {
        Ok(self.tick_interval()? * self.idle_grace_ticks)
    }

    /// Growth factor for an average utilization, if any band matches.
    pub fn growth_factor(&self, average: f64) -> Option<f64> {
        self.growth_bands
            .iter()
            .find(|band| band.contains(average))
            .map(|band| band.factor)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let tick = self.tick_interval()?;
        if tick.is_zero() {
            return Err(ConfigError::Invalid("tick_interval must be non-zero".into()));
        }
        if self.utilization_window()? < tick {
            return Err(ConfigError::Invalid(format!(
                "utilization_window ({}) is shorter than tick_interval ({})",
                self.utilization_window, self.tick_interval
            )));
        }
        if self.idle_grace_ticks == 0 {
            return Err(ConfigError::Invalid("idle_grace_ticks must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.destroy_utilization_threshold) {
            return Err(ConfigError::Invalid(format!(
                "destroy_utilization_threshold {} is outside [0, 1]",
                self.destroy_utilization_threshold
            )));
        }
        for (i, band) in self.growth_bands.iter().enumerate() {
            if !(0.0..=1.0).contains(&band.lower) {
                return Err(ConfigError::Invalid(format!(
                    "growth band {i}: lower bound {} is outside [0, 1]",
                    band.lower
                )));
            }
            if let Some(upper) = band.upper {
                if !(0.0..=1.0).contains(&upper) {
                    return Err(ConfigError::Invalid(format!(
                        "growth band {i}: upper bound {upper} is outside [0, 1]"
                    )));
                }
                if upper <= band.lower {
                    return Err(ConfigError::Invalid(format!(
                        "growth band {i}: upper bound {upper} must exceed lower bound {}",
                        band.lower
                    )));
                }
            }
            // A factor of 1.0 or less can never request an instance.
            if band.factor.is_nan() || band.factor <= 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "growth band {i}: factor {} must be greater than 1.0",
                    band.factor
                )));
            }
        }
        Ok(())
    }
}

/// Parse a duration string like "90s", "2m", "1h" (bare numbers are seconds).
pub fn parse_duration(s: &str) -> ConfigResult<Duration> {
    let s = s.trim();
    let (digits, unit) = if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else {
        (s, 1)
    };
    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Duration(s.to_string()))
}
