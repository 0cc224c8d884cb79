use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::gateway::GatewayConfig;
use super::logging::LoggingConfig;
use super::store::StoreConfig;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Prefix of environment variables that override file settings.
/// Nested keys are separated by `__`, e.g. `AUDITDESK_GATEWAY__BASE_URL`.
pub const ENV_PREFIX: &str = "AUDITDESK_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl From<Config> for ConfigV1 {
    fn from(config: Config) -> Self {
        match config {
            Config::ConfigV1(c) => c,
        }
    }
}

/// Load config from a YAML file, then apply `AUDITDESK_` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ConfigV1, figment::Error> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract(figment)
}

/// Parse a configuration document held in memory.
pub fn load_config_from_str(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    figment.extract::<Config>().map(ConfigV1::from)
}

/// The JSON schema for the configuration, pretty-printed.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}
