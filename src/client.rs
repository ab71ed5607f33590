use std::collections::HashMap;

use octocrab::models::workflows::{Job, Run};
use octocrab::models::RunId;
use octocrab::params::workflows::Filter;
use octocrab::workflows::{ListJobsBuilder, WorkflowsHandler};
use octocrab::{GitHubError, Octocrab};

use crate::billing::{BillingUsage, JobBillable};
use crate::provider::{JobPage, WorkflowProvider};
use crate::{JobInfo, RepositoryId, RunStatus, WorkflowRun};

pub struct GitHubApi {
    pub client: Octocrab,
}

impl GitHubApi {
    pub fn new(token: Option<String>) -> anyhow::Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let client = builder
            .build()
            .map_err(|error| anyhow::anyhow!("Cannot create GitHub client: {error:?}"))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl WorkflowProvider for GitHubApi {
    async fn get_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
    ) -> anyhow::Result<Option<WorkflowRun>> {
        let response: Result<Run, _> = self
            .client
            .get(
                format!("/repos/{owner}/{repo}/actions/runs/{run_id}"),
                None::<&()>,
            )
            .await;
        match response {
            Ok(run) => Ok(Some(parse_workflow_run(owner, repo, run))),
            Err(octocrab::Error::GitHub { source, .. }) if is_not_found(&source) => Ok(None),
            Err(error) => Err(anyhow::anyhow!("Cannot download workflow run: {error:?}")),
        }
    }

    async fn list_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
        page: u32,
        per_page: u8,
    ) -> anyhow::Result<JobPage> {
        let handler = self.client.workflows(owner, repo);
        let mut response = jobs_request(&handler, run_id, page, per_page)
            .send()
            .await
            .map_err(|error| anyhow::anyhow!("Cannot download workflow jobs: {error:?}"))?;
        let next_page = response.next.is_some().then_some(page + 1);
        let jobs = response.take_items().into_iter().map(parse_job).collect();
        Ok(JobPage { jobs, next_page })
    }

    async fn get_usage(
        &self,
        owner: &str,
        repo: &str,
        run_id: RunId,
    ) -> anyhow::Result<BillingUsage> {
        let response: BillableResponse = self
            .client
            .get(
                format!("/repos/{owner}/{repo}/actions/runs/{run_id}/timing"),
                None::<&()>,
            )
            .await
            .map_err(|error| anyhow::anyhow!("Cannot download billing data: {error:?}"))?;
        Ok(response.into_usage())
    }
}

/// Jobs of every attempt of the run, not only the latest one.
fn jobs_request<'a>(
    handler: &'a WorkflowsHandler<'_>,
    run_id: RunId,
    page: u32,
    per_page: u8,
) -> ListJobsBuilder<'a, 'a> {
    handler
        .list_jobs(run_id)
        .filter(Filter::All)
        .per_page(per_page)
        .page(page)
}

fn is_not_found(error: &GitHubError) -> bool {
    error.message == "Not Found"
}

fn parse_workflow_run(owner: &str, repo: &str, run: Run) -> WorkflowRun {
    WorkflowRun {
        id: run.id,
        name: run.name,
        repository: RepositoryId {
            owner: owner.to_string(),
            name: repo.to_string(),
        },
        event: run.event,
        head_branch: run.head_branch,
        head_sha: run.head_sha,
        run_number: run.run_number,
        status: RunStatus::parse(&run.status),
        conclusion: run.conclusion,
        created_at: run.created_at,
        updated_at: run.updated_at,
    }
}

fn parse_job(job: Job) -> JobInfo {
    JobInfo {
        id: job.id,
        name: job.name,
        status: job.status,
        conclusion: job.conclusion,
        labels: job.labels,
        started_at: job.started_at,
        completed_at: job.completed_at,
    }
}

#[derive(serde::Deserialize, Debug)]
struct RunPlatformInfo {
    #[serde(default)]
    job_runs: Vec<JobBillable>,
}

/// Response of the run timing endpoint. Runs without billable time may omit
/// `billable` entirely.
#[derive(serde::Deserialize, Debug)]
struct BillableResponse {
    #[serde(default)]
    billable: HashMap<String, RunPlatformInfo>,
}

impl BillableResponse {
    fn into_usage(self) -> BillingUsage {
        self.billable
            .into_iter()
            .map(|(platform, info)| (platform, info.job_runs))
            .collect()
    }
}
