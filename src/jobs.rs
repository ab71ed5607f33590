use std::time::Instant;

use octocrab::models::RunId;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::provider::{bounded, WorkflowProvider};
use crate::JobInfo;

/// Lists every job of a run, following pages until the provider reports no
/// next page. Any failed page fails the whole listing.
pub async fn list_jobs<P: WorkflowProvider + ?Sized>(
    provider: &P,
    owner: &str,
    repo: &str,
    run_id: RunId,
    config: &FetchConfig,
) -> Result<Vec<JobInfo>, FetchError> {
    let start = Instant::now();
    let mut jobs = vec![];
    let mut page = 1u32;
    let mut requests = 0usize;
    loop {
        let response = bounded(
            "listing workflow jobs",
            config.timeout,
            provider.list_jobs(owner, repo, run_id, page, config.jobs_per_page),
        )
        .await?;
        requests += 1;
        jobs.extend(response.jobs);

        match response.next_page {
            Some(next) if next != 0 => page = next,
            _ => break,
        }
    }
    log::trace!(
        "Fetched {} jobs for {owner}/{repo} run {run_id} in {requests} requests ({:?})",
        jobs.len(),
        start.elapsed()
    );
    Ok(jobs)
}
