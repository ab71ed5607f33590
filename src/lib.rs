use std::fmt::{Display, Formatter};
use std::time::Duration;

use chrono::{DateTime, Utc};
use octocrab::models::workflows::{Conclusion, Status as JobStatus};
use octocrab::models::{JobId, RunId};

pub mod billing;
pub mod cache;
pub mod client;
pub mod config;
pub mod cost;
pub mod error;
pub mod fetch;
pub mod jobs;
pub mod provider;

pub use cache::{CacheKey, CacheStore, FileStore, MemoryStore, RunCache};
pub use config::FetchConfig;
pub use cost::{RateTable, TenthsOfCent};
pub use error::FetchError;
pub use fetch::RunFetcher;
pub use provider::WorkflowProvider;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Requested,
    Queued,
    Waiting,
    Pending,
    InProgress,
    Completed,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "requested" => Self::Requested,
            "queued" => Self::Queued,
            "waiting" => Self::Waiting,
            "pending" => Self::Pending,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Queued => "queued",
            Self::Waiting => "waiting",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow run metadata, as reported by the provider.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,
    pub name: String,
    pub repository: RepositoryId,
    pub event: String,
    pub head_branch: String,
    pub head_sha: String,
    pub run_number: i64,
    pub status: RunStatus,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRun {
    pub fn duration(&self) -> Option<Duration> {
        (self.updated_at - self.created_at).to_std().ok()
    }
}

/// A single job of a workflow run, before any cost was attached to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobInfo {
    pub id: JobId,
    pub name: String,
    pub status: JobStatus,
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkflowJob {
    #[serde(flatten)]
    pub job: JobInfo,
    /// Runner class the job was billed under, or "Free" when it has no billable usage.
    pub runner: String,
    pub cost: TenthsOfCent,
}

impl WorkflowJob {
    pub fn duration(&self) -> Duration {
        (self.job.completed_at.unwrap_or(self.job.started_at) - self.job.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Run metadata together with its priced jobs. This is what gets cached.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkflowRunData {
    #[serde(flatten)]
    pub run: WorkflowRun,
    #[serde(default)]
    pub jobs: Vec<WorkflowJob>,
}

impl WorkflowRunData {
    pub fn total_cost(&self) -> TenthsOfCent {
        self.jobs.iter().map(|job| job.cost).sum()
    }
}
