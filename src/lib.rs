pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HhClient, PgStore};
pub use config::{ApiConfig, AppConfig, StoreConfig};
pub use core::{
    etl::{EtlEngine, SetupReport},
    session::{prompt_store_name, Session, SessionState, SessionSummary},
};
pub use domain::model::StoreName;
pub use utils::error::{EtlError, Result};
