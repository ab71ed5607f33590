use std::future::Future;
use std::time::Duration;

use octocrab::models::RunId;

use crate::billing::BillingUsage;
use crate::error::FetchError;
use crate::{JobInfo, WorkflowRun};

/// One page of jobs and the number of the page after it, if any.
#[derive(Debug, Clone, Default)]
pub struct JobPage {
    pub jobs: Vec<JobInfo>,
    pub next_page: Option<u32>,
}

/// Remote source of workflow run data.
///
/// Implementations own authentication and rate-limit handling; callers only
/// bound each call with a timeout.
#[async_trait::async_trait]
pub trait WorkflowProvider: Send + Sync {
    /// Returns `Ok(None)` if the provider has no such run.
    async fn get_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
    ) -> anyhow::Result<Option<WorkflowRun>>;

    async fn list_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
        page: u32,
        per_page: u8,
    ) -> anyhow::Result<JobPage>;

    async fn get_usage(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
    ) -> anyhow::Result<BillingUsage>;
}

/// Runs a provider call under `timeout`.
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, FetchError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(FetchError::Provider { operation, source }),
        Err(_) => Err(FetchError::Timeout { operation, timeout }),
    }
}
