//! Process configuration, validation, and the install-once global.
//!
//! [`WatConfig`] is read once at startup (by `wat_init` on the C side, or
//! [`install`] from Rust). Every array growth consults [`current()`], which
//! falls back to [`WatConfig::default()`] if nothing was installed.

use std::error::Error;
use std::fmt;
use std::sync::OnceLock;

// ── ArrayGrowth ────────────────────────────────────────────────────

/// Geometric growth policy for array containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayGrowth {
    /// Capacity allocated on the first append to an empty array. Default: 4.
    /// Must be at least 1.
    pub initial_capacity: u32,
    /// Multiplier applied when a full array grows. Default: 2.
    /// Must be at least 2, otherwise appends stop being amortized O(1).
    pub growth_factor: u32,
}

impl ArrayGrowth {
    /// Default first-growth capacity.
    pub const DEFAULT_INITIAL_CAPACITY: u32 = 4;

    /// Default growth multiplier.
    pub const DEFAULT_GROWTH_FACTOR: u32 = 2;

    /// Capacity to grow to from `current` so that at least `required`
    /// slots fit. Saturates at `usize::MAX`; callers bound-check the result.
    pub fn next_capacity(&self, current: usize, required: usize) -> usize {
        let grown = if current == 0 {
            self.initial_capacity as usize
        } else {
            current.saturating_mul(self.growth_factor as usize)
        };
        grown.max(required)
    }
}

impl Default for ArrayGrowth {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`WatConfig::validate()`] and [`install()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `array.initial_capacity` is zero.
    ZeroInitialCapacity,
    /// `array.growth_factor` is below 2.
    GrowthFactorTooSmall {
        /// The configured factor.
        configured: u32,
    },
    /// `log_filter` is present but empty.
    EmptyLogFilter,
    /// A configuration was already installed for this process.
    AlreadyInstalled,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInitialCapacity => write!(f, "array initial_capacity must be at least 1"),
            Self::GrowthFactorTooSmall { configured } => {
                write!(f, "array growth_factor {configured} is below minimum of 2")
            }
            Self::EmptyLogFilter => write!(f, "log_filter is empty"),
            Self::AlreadyInstalled => write!(f, "configuration already installed"),
        }
    }
}

impl Error for ConfigError {}

// ── WatConfig ──────────────────────────────────────────────────────

/// Complete process configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatConfig {
    /// Array growth policy shared by every array type.
    pub array: ArrayGrowth,
    /// `tracing` filter directives (e.g. `"wat_event=debug,info"`).
    /// `None` defers to the `WAT_LOG` environment variable, then `info`.
    pub log_filter: Option<String>,
}

impl WatConfig {
    /// Environment variable consulted when `log_filter` is `None`.
    pub const LOG_ENV: &'static str = "WAT_LOG";

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.array.initial_capacity == 0 {
            return Err(ConfigError::ZeroInitialCapacity);
        }
        if self.array.growth_factor < 2 {
            return Err(ConfigError::GrowthFactorTooSmall {
                configured: self.array.growth_factor,
            });
        }
        if matches!(&self.log_filter, Some(f) if f.trim().is_empty()) {
            return Err(ConfigError::EmptyLogFilter);
        }
        Ok(())
    }
}

static INSTALLED: OnceLock<WatConfig> = OnceLock::new();

/// Validate and install `config` for the rest of the process.
///
/// Fails with [`ConfigError::AlreadyInstalled`] if a configuration was
/// installed earlier, or if [`current()`] already latched the default.
pub fn install(config: WatConfig) -> Result<&'static WatConfig, ConfigError> {
    config.validate()?;
    let mut slot = Some(config);
    let installed = INSTALLED.get_or_init(|| slot.take().unwrap_or_default());
    if slot.is_some() {
        return Err(ConfigError::AlreadyInstalled);
    }
    Ok(installed)
}

/// The installed configuration, latching the default on first use.
pub fn current() -> &'static WatConfig {
    INSTALLED.get_or_init(WatConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(WatConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_initial_capacity_rejected() {
        let mut cfg = WatConfig::default();
        cfg.array.initial_capacity = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroInitialCapacity));
    }

    #[test]
    fn growth_factor_one_rejected() {
        let mut cfg = WatConfig::default();
        cfg.array.growth_factor = 1;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::GrowthFactorTooSmall { configured: 1 })
        );
    }

    #[test]
    fn blank_log_filter_rejected() {
        let cfg = WatConfig {
            log_filter: Some("  ".into()),
            ..WatConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyLogFilter));
    }

    #[test]
    fn next_capacity_is_geometric() {
        let g = ArrayGrowth::default();
        assert_eq!(g.next_capacity(0, 1), 4);
        assert_eq!(g.next_capacity(4, 5), 8);
        assert_eq!(g.next_capacity(8, 9), 16);
    }

    #[test]
    fn next_capacity_honours_required() {
        let g = ArrayGrowth::default();
        assert_eq!(g.next_capacity(0, 10), 10);
        assert_eq!(g.next_capacity(usize::MAX / 2 + 1, 1), usize::MAX);
    }

    #[test]
    fn install_after_current_fails() {
        // Unit tests share one process; whichever path ran first latched
        // a value, so a second install must be rejected.
        let _ = current();
        assert_eq!(
            install(WatConfig::default()),
            Err(ConfigError::AlreadyInstalled)
        );
    }
}
