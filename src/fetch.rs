use std::time::Instant;

use octocrab::models::RunId;

use crate::billing::fetch_billing;
use crate::cache::{CacheKey, CacheStore, RunCache};
use crate::config::FetchConfig;
use crate::cost::job_cost;
use crate::error::FetchError;
use crate::jobs::list_jobs;
use crate::provider::{bounded, WorkflowProvider};
use crate::{WorkflowJob, WorkflowRunData};

/// Gathers the priced jobs of completed workflow runs, backed by a cache.
pub struct RunFetcher<P, S> {
    provider: P,
    cache: RunCache<S>,
    config: FetchConfig,
}

impl<P: WorkflowProvider, S: CacheStore> RunFetcher<P, S> {
    pub fn new(provider: P, store: S, config: FetchConfig) -> Self {
        Self {
            provider,
            cache: RunCache::new(store),
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &RunCache<S> {
        &self.cache
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Returns the data of a completed run.
    ///
    /// A cached entry is returned as is unless `force_update` is set. Otherwise
    /// the run is fetched, its jobs are priced and the result replaces the
    /// cache entry. Nothing is written if any step fails.
    pub async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
        force_update: bool,
    ) -> Result<WorkflowRunData, FetchError> {
        let key = CacheKey::new(owner, repo, run_id);
        let start = Instant::now();
        log::info!("Gathering workflow run {run_id} of {owner}/{repo}");

        if !force_update {
            if let Some(data) = self.cache.lookup(&key).await? {
                log::debug!("Read workflow run {run_id} from {key}");
                return Ok(data);
            }
        }

        log::debug!("Fetching workflow run {run_id} from the provider");
        let data = self.fetch_remote(owner, repo, run_id).await?;
        self.cache.write(&key, &data).await?;

        log::info!(
            "Gathered workflow run {run_id} with {} jobs in {:?}",
            data.jobs.len(),
            start.elapsed()
        );
        Ok(data)
    }

    async fn fetch_remote(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
    ) -> Result<WorkflowRunData, FetchError> {
        let run = bounded(
            "fetching workflow run",
            self.config.timeout,
            self.provider.get_run(owner, repo, run_id),
        )
        .await?
        .ok_or(FetchError::RunNotFound(run_id))?;
        if !run.status.is_completed() {
            return Err(FetchError::RunIncomplete {
                run_id,
                status: run.status,
            });
        }

        // The first failure drops the other future.
        let (jobs, billing) = futures_util::future::try_join(
            list_jobs(&self.provider, owner, repo, run_id, &self.config),
            fetch_billing(&self.provider, owner, repo, run_id, &self.config),
        )
        .await?;

        let jobs = jobs
            .into_iter()
            .map(|job| {
                let (runner, cost) = job_cost(job.id, &billing, &self.config.rates)?;
                Ok(WorkflowJob { job, runner, cost })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        Ok(WorkflowRunData { run, jobs })
    }
}
