//! CLI configuration loading
//!
//! Precedence, lowest first: built-in defaults, the TOML configuration file,
//! `KNMI__*` environment variables, command-line flags.

use std::path::Path;

use integration_knmi::{KnmiConfig, TrailingDay};
use secrecy::SecretString;
use tracing::debug;

/// Values given on the command line that override loaded configuration
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub drop_trailing_day: bool,
}

impl Overrides {
    /// Apply the overrides on top of a loaded configuration
    #[must_use]
    pub fn apply(self, mut config: KnmiConfig) -> KnmiConfig {
        if let Some(api_key) = self.api_key {
            config.api_key = Some(SecretString::from(api_key));
        }
        if let Some(latitude) = self.latitude {
            config.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            config.longitude = longitude;
        }
        if self.drop_trailing_day {
            config.trailing_day = TrailingDay::Drop;
        }
        config
    }
}

/// Load the client configuration from an optional file and the environment
///
/// A missing file is not an error; defaults apply.
pub fn load(path: &Path) -> Result<KnmiConfig, config::ConfigError> {
    debug!(path = %path.display(), "Loading configuration");

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        // e.g. KNMI__API_KEY, KNMI__LATITUDE
        .add_source(config::Environment::with_prefix("KNMI").separator("__"));

    builder.build()?.try_deserialize()
}
