pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConnectivityProbe, HttpBackend};
pub use app::{build_runner, Selection};
pub use config::SmokeConfig;
pub use crate::core::runner::{ScenarioReport, SmokeRunner};
pub use utils::error::{Result, SmokeError};
