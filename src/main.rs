use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fincalc::api::cli::{Cli, CliError, execute};
use fincalc::core::CalcError;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(err) = execute(cli.command).await {
        tracing::debug!(error = %err, "command failed");
        eprintln!("error: {err}");
        if let CliError::Calc(CalcError::Validation(fields)) = &err {
            for (field, message) in fields.iter() {
                eprintln!("  {field}: {message}");
            }
        }
        std::process::exit(err.exit_code());
    }
}
