use b3_carteira::{Settings, cli, config};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// B3 Carteira: daily index portfolio to Parquet on S3, plus the Glue job trigger
#[derive(Parser)]
#[command(name = "b3-carteira", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source configuration from (skipped if missing)
    #[arg(short, long, global = true, default_value = ".env")]
    env: PathBuf,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every portfolio page and upload the day's Parquet file
    Extract {
        /// Abort on the first failed page instead of skipping it
        #[arg(long)]
        strict: bool,

        /// Run date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Also write the Parquet file to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the Glue job and print the handler response as JSON
    Trigger {
        /// JSON file with the invoking event
        #[arg(long)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_loaded = config::load_env_file(&cli.env)?;

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match env_loaded {
        true => log::debug!("Loaded environment from {}", cli.env.display()),
        false => log::debug!(
            "No env file at {}, using process environment",
            cli.env.display()
        ),
    }

    match cli.command {
        Commands::Extract {
            strict,
            date,
            output,
        } => {
            let settings = Settings::from_env()?;
            let run_date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            log::info!(
                "Extracting {} portfolio for {}",
                settings.index.cyan(),
                run_date.bright_black()
            );

            let options = cli::run_options(&settings, run_date, strict, output);
            let summary = cli::extract(&settings, &options).await?;

            match &summary.key {
                Some(key) => log::info!(
                    "✓ Wrote {} row(s) to {} ({} page(s) skipped)",
                    summary.rows_written,
                    key.bright_black(),
                    summary.skipped_pages
                ),
                None => log::warn!(
                    "No data retrieved, nothing uploaded ({} page(s) skipped)",
                    summary.skipped_pages
                ),
            }
        }
        Commands::Trigger { event } => {
            let event = cli::read_event(event.as_deref())?;
            let response = cli::trigger(&event).await;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if !response.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
