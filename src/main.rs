use basecamp::config::AppConfig;
use basecamp::database::MongoConnector;
use basecamp::lifecycle::{ApplicationServer, exit_status};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let connector = MongoConnector::with_app_name(env!("CARGO_PKG_NAME"));
    let outcome = ApplicationServer::new(config, connector).run().await;
    ExitCode::from(exit_status(&outcome))
}
