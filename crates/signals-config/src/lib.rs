//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, DataSettings, LoggingConfig, ServerSettings, TierSettings,
    TiersConfig, WebhookSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Prefix of environment overrides, e.g. `MSB__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "MSB";

/// Load configuration from file and environment.
///
/// A missing file is not an error; built-in defaults and environment
/// overrides still apply.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = config.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
