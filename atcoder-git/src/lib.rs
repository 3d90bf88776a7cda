pub mod configuration;
pub mod data_processing;
pub mod detail;
pub mod error;
pub mod language;
pub mod path_resolver;
pub mod rate_limit;
pub mod repository;
pub mod sync;
pub mod telemetry;

pub use error::{Error, Result};
