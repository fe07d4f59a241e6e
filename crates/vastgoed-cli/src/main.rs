mod analyze;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "vastgoed-cli")]
#[command(about = "Run a Dutch property analysis and print it as JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse a single address
    Address {
        /// Postal code, e.g. 1015MN
        #[arg(long)]
        postal_code: String,

        /// House number, optionally with a trailing addition (72, 72A)
        #[arg(long)]
        house_number: String,

        /// House number addition (A, bis, 1)
        #[arg(long)]
        addition: Option<String>,

        #[arg(long, default_value = "")]
        street: String,

        #[arg(long, default_value = "")]
        city: String,

        /// Gather facts only, without the AI summary
        #[arg(long)]
        no_summary: bool,
    },
    /// Analyse every listing in a postal code
    Area {
        #[arg(long)]
        postal_code: String,

        /// Gather facts only, without the AI summary
        #[arg(long)]
        no_summary: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = vastgoed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON result only.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Address {
            postal_code,
            house_number,
            addition,
            street,
            city,
            no_summary,
        } => {
            let subject = vastgoed_core::IndividualSubject::new(
                &street,
                &house_number,
                addition.as_deref(),
                &city,
                &postal_code,
            )?;
            analyze::run(
                &config,
                vastgoed_core::Subject::Individual(subject),
                !no_summary,
            )
            .await
        }
        Commands::Area {
            postal_code,
            no_summary,
        } => {
            let subject = vastgoed_core::AreaSubject::new(&postal_code)?;
            analyze::run(&config, vastgoed_core::Subject::Area(subject), !no_summary).await
        }
    }
}

#[cfg(test)]
mod tests;
