use crate::config::AppConfig;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "hh-vacancy-etl")]
#[command(about = "Load hh.ru employers and vacancies into PostgreSQL and query them")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Store instance name (prefixed with the sandbox prefix); prompted for when omitted
    #[arg(short, long)]
    pub database: Option<String>,

    #[arg(long)]
    pub api_base_url: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Command-line flags win over file and environment settings.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.api_base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(host) = &self.host {
            config.store.host = host.clone();
        }
        if let Some(port) = self.port {
            config.store.port = port;
        }
    }
}
