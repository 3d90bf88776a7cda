use crate::data_processing::DEFAULT_PROBLEMS_BASE_URL;
use crate::detail::{DEFAULT_ATCODER_BASE_URL, DetailSourceKind};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub detail: DetailSettings,
    pub git: GitSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiSettings {
    pub problems_base_url: String,
    pub atcoder_base_url: String,
    /// Minimum pause between two AtCoder Problems API requests.
    pub problems_interval_ms: u64,
    /// Minimum pause between two submission page requests.
    pub atcoder_interval_ms: u64,
}

impl ApiSettings {
    pub fn problems_interval(&self) -> Duration {
        Duration::from_millis(self.problems_interval_ms)
    }

    pub fn atcoder_interval(&self) -> Duration {
        Duration::from_millis(self.atcoder_interval_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DetailSettings {
    pub source: DetailSourceKind,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GitSettings {
    pub program: String,
}

fn build(environment: Environment) -> Result<Settings, ConfigError> {
    Config::builder()
        .set_default("api.problems_base_url", DEFAULT_PROBLEMS_BASE_URL)?
        .set_default("api.atcoder_base_url", DEFAULT_ATCODER_BASE_URL)?
        .set_default("api.problems_interval_ms", 1000)?
        .set_default("api.atcoder_interval_ms", 3000)?
        .set_default("detail.source", "html")?
        .set_default("git.program", "git")?
        .add_source(environment)
        .build()?
        .try_deserialize()
}

fn environment() -> Environment {
    Environment::with_prefix("ATCODER_GIT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Built-in defaults, overridden by `ATCODER_GIT_*` environment variables,
/// e.g. `ATCODER_GIT_API__ATCODER_INTERVAL_MS=5000` or `ATCODER_GIT_DETAIL__SOURCE=embedded`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    build(environment())
}
