use clap::Parser;
use hh_vacancy_etl::utils::error::ErrorSeverity;
use hh_vacancy_etl::utils::{logger, validation::Validate};
use hh_vacancy_etl::{
    prompt_store_name, AppConfig, CliConfig, EtlError, HhClient, PgStore, Session, StoreName,
};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting hh-vacancy-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let store_name = match resolve_store_name(&cli, &config, &mut input, &mut output) {
        Ok(name) => name,
        Err(e) => exit_with(e),
    };

    let source = match HhClient::new(config.api.clone()) {
        Ok(source) => source,
        Err(e) => exit_with(e),
    };
    let store = match PgStore::new(config.store.clone(), store_name) {
        Ok(store) => store,
        Err(e) => exit_with(e),
    };

    let mut session = Session::new(source, store, input, output);
    match session.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Session completed: {} employers, {} vacancies, {} queries",
                summary.load.employers_inserted,
                summary.load.vacancies_inserted,
                summary.queries_run
            );
            if summary.fetch_failures > 0 {
                tracing::warn!("⚠️ {} API requests failed during setup", summary.fetch_failures);
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> hh_vacancy_etl::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;
    tracing::debug!("Effective config: {:?}", config);
    Ok(config)
}

fn resolve_store_name<R: BufRead, W: Write>(
    cli: &CliConfig,
    config: &AppConfig,
    input: &mut R,
    output: &mut W,
) -> hh_vacancy_etl::Result<StoreName> {
    match &cli.database {
        Some(raw) => StoreName::sandboxed(raw, &config.store.sandbox_prefix),
        None => prompt_store_name(input, output, &config.store.sandbox_prefix),
    }
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ hh-vacancy-etl failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
