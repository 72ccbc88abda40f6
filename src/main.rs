mod api;
mod config;
mod controller;
mod logging;
mod models;
mod tui;
mod view;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;

use api::JobsClient;
use config::ClientConfig;
use controller::{fetch_into, DetailController};
use view::View;

#[derive(Parser)]
#[command(name = "jobview")]
#[command(about = "Job posting viewer - details, skills, and similar openings")]
struct Cli {
    /// Jobs API endpoint (job id is appended)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token (otherwise JOBVIEW_TOKEN or the token file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// File holding the bearer token
    #[arg(long, global = true)]
    token_file: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a job once and print it
    Show {
        /// Job ID
        id: String,

        /// Wrap width for text blocks
        #[arg(short, long, default_value = "80")]
        width: usize,
    },

    /// Browse a job and its similar jobs interactively
    Browse {
        /// Job ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init()?;
    tracing::debug!(path = %log_path.display(), "Logging initialized");

    let token_file = cli.token_file.as_deref().map(config::expand_home);
    let config = ClientConfig::resolve(
        cli.base_url.as_deref(),
        cli.token.as_deref(),
        token_file.as_deref(),
    )?
    .with_timeout(cli.timeout_secs.map(Duration::from_secs));
    let client = JobsClient::new(config)?;

    match cli.command {
        Commands::Show { id, width } => {
            let mut controller = DetailController::new();
            fetch_into(&mut controller, &client, &id).await;
            tracing::info!(
                job_id = %id,
                state = ?controller.state(),
                similar = controller.similar_jobs().len(),
                has_details = controller.job().is_some(),
                "Show finished"
            );

            let page = controller.view();
            let text = view::view_text(&page, controller.fetched_at(), width);
            for line in view::plain_lines(&text) {
                println!("{}", line);
            }

            if page == View::Failure {
                return Err(anyhow!(
                    "Could not load job {} (details in {})",
                    id,
                    log_path.display()
                ));
            }
        }

        Commands::Browse { id } => {
            tui::run_browse(client, &id).await?;
        }
    }

    Ok(())
}
