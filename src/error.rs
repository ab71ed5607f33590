use std::time::Duration;

use octocrab::models::RunId;
use thiserror::Error;

use crate::RunStatus;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("workflow run '{0}' not found")]
    RunNotFound(RunId),
    #[error("workflow run '{run_id}' is not completed yet (status: {status})")]
    RunIncomplete { run_id: RunId, status: RunStatus },
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("malformed cache entry '{key}': {source}")]
    MalformedCache {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no rate available for runner {runner}")]
    UnknownRunnerRate { runner: String },
    #[error("{operation} failed: {source:#}")]
    Provider {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("cannot access cache entry '{key}': {source}")]
    Cache {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize workflow run '{run_id}': {source}")]
    Serialize {
        run_id: RunId,
        #[source]
        source: serde_json::Error,
    },
}
