use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use octocrab::models::RunId;

use workflow_metrics::client::GitHubApi;
use workflow_metrics::config::{DEFAULT_DATA_DIR, DEFAULT_TIMEOUT};
use workflow_metrics::{CacheKey, FetchConfig, FileStore, RunFetcher};

#[derive(Parser)]
#[command(name = "workflow-metrics")]
struct Args {
    /// Log filter in `RUST_LOG` syntax, e.g. `debug` or `workflow_metrics=trace`.
    #[arg(long, short = 'l', global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Gather cost metrics of a completed workflow run.
    Gather {
        #[arg(long, short = 'o')]
        owner: String,
        #[arg(long, short = 'r')]
        repo: String,
        #[arg(long, short = 'w')]
        workflow_run_id: u64,
        /// Re-fetch the run even if it is already cached.
        #[arg(long, short = 'u')]
        force_update: bool,
        #[arg(long, short = 't', env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if let Some(filters) = &args.log_level {
        logger.parse_filters(filters);
    }
    logger.init();

    match args.command {
        Command::Gather {
            owner,
            repo,
            workflow_run_id,
            force_update,
            github_token,
            data_dir,
            timeout_secs,
        } => {
            if github_token.is_none() {
                log::warn!("GitHub token not provided, will likely hit rate limits quickly");
            }
            let api = GitHubApi::new(github_token)?;
            let config = FetchConfig::default().with_timeout(Duration::from_secs(timeout_secs));
            let store = FileStore::new(data_dir);
            let fetcher = RunFetcher::new(api, store, config);

            let run_id = RunId(workflow_run_id);
            let data = fetcher
                .fetch(&owner, &repo, run_id, force_update)
                .await
                .with_context(|| format!("Cannot gather workflow run {run_id}"))?;

            for job in &data.jobs {
                println!(
                    "{:<60} {:<20} {:>10?} {}",
                    job.job.name,
                    job.runner,
                    job.duration(),
                    job.cost
                );
            }
            println!("Total: {}", data.total_cost());
            let path = fetcher
                .cache()
                .store()
                .path(&CacheKey::new(&owner, &repo, run_id).to_string());
            println!("Saved to {}", path.display());
        }
    }
    Ok(())
}
