use std::collections::BTreeMap;
use std::time::Instant;

use octocrab::models::{JobId, RunId};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::provider::{bounded, WorkflowProvider};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct JobBillable {
    pub job_id: JobId,
    pub duration_ms: u64,
}

/// Billable job durations of one run, grouped by runner class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingUsage {
    runners: BTreeMap<String, Vec<JobBillable>>,
}

impl BillingUsage {
    pub fn insert(&mut self, runner: impl Into<String>, job: JobBillable) {
        self.runners.entry(runner.into()).or_default().push(job);
    }

    pub fn runners(&self) -> impl Iterator<Item = (&str, &[JobBillable])> {
        self.runners
            .iter()
            .map(|(runner, jobs)| (runner.as_str(), jobs.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

impl FromIterator<(String, Vec<JobBillable>)> for BillingUsage {
    fn from_iter<I: IntoIterator<Item = (String, Vec<JobBillable>)>>(iter: I) -> Self {
        Self {
            runners: iter.into_iter().collect(),
        }
    }
}

/// Fetches the billing usage of a run. An empty result is not an error.
pub async fn fetch_billing<P: WorkflowProvider + ?Sized>(
    provider: &P,
    owner: &str,
    repo: &str,
    run_id: RunId,
    config: &FetchConfig,
) -> Result<BillingUsage, FetchError> {
    let start = Instant::now();
    let usage = bounded(
        "fetching billing data",
        config.timeout,
        provider.get_usage(owner, repo, run_id),
    )
    .await?;
    log::trace!(
        "Fetched billing data for {owner}/{repo} run {run_id} in {:?} ({} runner classes)",
        start.elapsed(),
        usage.runners.len()
    );
    Ok(usage)
}
