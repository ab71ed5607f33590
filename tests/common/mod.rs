#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use octocrab::models::workflows::{Conclusion, Status};
use octocrab::models::{JobId, RunId};

use workflow_metrics::billing::{BillingUsage, JobBillable};
use workflow_metrics::provider::{JobPage, WorkflowProvider};
use workflow_metrics::{JobInfo, RepositoryId, RunStatus, WorkflowRun};

pub const OWNER: &str = "smartcontractkit";
pub const REPO: &str = "chainlink";
pub const RUN_ID: RunId = RunId(14093870542);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn run(status: RunStatus) -> WorkflowRun {
    WorkflowRun {
        id: RUN_ID,
        name: "CI".to_string(),
        repository: RepositoryId {
            owner: OWNER.to_string(),
            name: REPO.to_string(),
        },
        event: "pull_request".to_string(),
        head_branch: "feature".to_string(),
        head_sha: "0123abcd".to_string(),
        run_number: 7,
        status,
        conclusion: status.is_completed().then(|| "success".to_string()),
        created_at: Utc.with_ymd_and_hms(2025, 3, 26, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 3, 26, 12, 30, 0).unwrap(),
    }
}

pub fn job(id: u64) -> JobInfo {
    let started_at = Utc.with_ymd_and_hms(2025, 3, 26, 12, 1, 0).unwrap();
    JobInfo {
        id: JobId(id),
        name: format!("job-{id}"),
        status: Status::Completed,
        conclusion: Some(Conclusion::Success),
        labels: vec!["ubuntu-latest".to_string()],
        started_at,
        completed_at: Some(started_at + chrono::Duration::minutes(3)),
    }
}

/// Splits `ids` into pages of `per_page` jobs.
pub fn pages(ids: std::ops::Range<u64>, per_page: usize) -> Vec<Vec<JobInfo>> {
    let jobs: Vec<_> = ids.map(job).collect();
    jobs.chunks(per_page).map(<[JobInfo]>::to_vec).collect()
}

pub fn usage(entries: &[(&str, u64, u64)]) -> BillingUsage {
    let mut usage = BillingUsage::default();
    for (runner, job_id, duration_ms) in entries {
        usage.insert(
            *runner,
            JobBillable {
                job_id: JobId(*job_id),
                duration_ms: *duration_ms,
            },
        );
    }
    usage
}

/// Provider answering from fixed data and counting calls.
pub struct MockProvider {
    pub run: Option<WorkflowRun>,
    pub pages: Vec<Vec<JobInfo>>,
    pub usage: BillingUsage,
    pub run_delay: Option<Duration>,
    /// Page number that answers only after the given delay.
    pub page_delay: Option<(u32, Duration)>,
    pub usage_delay: Option<Duration>,
    pub failing_page: Option<u32>,
    pub get_run_calls: AtomicUsize,
    pub list_jobs_calls: AtomicUsize,
    pub get_usage_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(run: Option<WorkflowRun>, pages: Vec<Vec<JobInfo>>, usage: BillingUsage) -> Self {
        Self {
            run,
            pages,
            usage,
            run_delay: None,
            page_delay: None,
            usage_delay: None,
            failing_page: None,
            get_run_calls: AtomicUsize::new(0),
            list_jobs_calls: AtomicUsize::new(0),
            get_usage_calls: AtomicUsize::new(0),
        }
    }

    pub fn remote_calls(&self) -> usize {
        self.get_run_calls.load(Ordering::SeqCst)
            + self.list_jobs_calls.load(Ordering::SeqCst)
            + self.get_usage_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WorkflowProvider for MockProvider {
    async fn get_run(
        &self,
        _owner: &str,
        _repo: &str,
        _run_id: RunId,
    ) -> anyhow::Result<Option<WorkflowRun>> {
        self.get_run_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.run.clone())
    }

    async fn list_jobs(
        &self,
        _owner: &str,
        _repo: &str,
        _run_id: RunId,
        page: u32,
        per_page: u8,
    ) -> anyhow::Result<JobPage> {
        self.list_jobs_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(per_page, 100);
        if self.failing_page == Some(page) {
            anyhow::bail!("page {page} unavailable");
        }
        if let Some((slow_page, delay)) = self.page_delay {
            if slow_page == page {
                tokio::time::sleep(delay).await;
            }
        }
        let index = page as usize - 1;
        let jobs = self.pages.get(index).cloned().unwrap_or_default();
        let next_page = (index + 1 < self.pages.len()).then_some(page + 1);
        Ok(JobPage { jobs, next_page })
    }

    async fn get_usage(
        &self,
        _owner: &str,
        _repo: &str,
        _run_id: RunId,
    ) -> anyhow::Result<BillingUsage> {
        self.get_usage_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.usage_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.usage.clone())
    }
}
