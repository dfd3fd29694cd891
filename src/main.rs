use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

mod blob;
mod catalog;
mod config;
mod dispatch;
mod error;
mod feed;
mod init;
mod output;
mod preview;
mod process;
mod queue;
mod source;
mod telemetry;
mod work_item;

#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(name = "rssfan", about = "Fan RSS sources out into filtered, republished feeds")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create catalog and queue tables
    Init,
    /// Edit the source catalog
    Source(source::SourceCmd),
    /// Enqueue one work item per catalog record
    Dispatch(dispatch::DispatchCmd),
    /// Consume work items and publish filtered feeds
    Process(process::ProcessCmd),
    /// Render one source locally without queue or blob store
    Preview(preview::PreviewCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and RSSFAN_LOG_FORMAT
    telemetry::config::init_tracing();
    let cfg = config::AppConfig::from_env()?;

    match cli.command {
        // preview never touches the database
        Commands::Preview(args) => preview::run(&cfg, args).await?,
        command => {
            let dsn = cli
                .dsn
                .or_else(|| env::var("DATABASE_URL").ok())
                .context("Please provide --dsn or set DATABASE_URL in .env")?;
            let pool = init::connect(&dsn).await?;
            match command {
                Commands::Init => init::run(&pool).await?,
                Commands::Source(args) => source::run(&pool, &cfg, args).await?,
                Commands::Dispatch(args) => dispatch::run(&pool, &cfg, args).await?,
                Commands::Process(args) => process::run(&pool, &cfg, args).await?,
                Commands::Preview(_) => unreachable!("handled before connecting"),
            }
        }
    }

    Ok(())
}
