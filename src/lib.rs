pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod integration;
pub mod utils;

pub use app::{build_router, serve, AppState};
pub use config::{CliConfig, ServerSettings, TomlConfig};
pub use crate::core::calculus::CasCalculus;
pub use domain::ports::Calculus;
pub use utils::error::{CalcError, Result};
