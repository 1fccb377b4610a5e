use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod period;
pub mod settings;
pub mod universe;

// Re-export the core types to provide a clean public API.
pub use logging::{LoggingConfig, init_logging};
pub use period::{PeriodConfig, Preset};
pub use settings::{AnalysisConfig, Config, SpreadProxySpec, YieldCurveSpec};
pub use universe::{AssetSpec, Universe, UniverseGroup, parse_asset_list};

/// Loads the application configuration from a TOML file.
///
/// Values can be overridden through `MONITOR__`-prefixed environment variables,
/// with `__` separating nested keys (e.g. `MONITOR__ANALYSIS__PERIODS_PER_YEAR=260`).
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("MONITOR")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    finish(builder)
}

/// Same as [`load_config`] but from an in-memory TOML document, without
/// environment overrides.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
