use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{fmt, EnvFilter};

use claimgate::settings::Settings;
use claimgate::{check, web};

#[derive(Parser, Debug)]
#[command(
    name = "claimgate",
    version,
    about = "Claims-based authorization policy engine"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the authorization API (default)
    Serve,
    /// Evaluate one principal against one policy and print the decision
    Check {
        /// JSON file holding the principal
        #[arg(long)]
        principal: PathBuf,
        /// Policy name, e.g. "Claim.DoB" or "Level5"
        #[arg(long)]
        policy: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            web::serve(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { principal, policy } => {
            let authorizer = web::build_authorizer(&settings)?;
            let response = check::check_file(&authorizer, &principal, &policy)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&response).into_diagnostic()?
            );
            Ok(if response.allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
