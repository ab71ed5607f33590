use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::Add;

use octocrab::models::JobId;

use crate::billing::BillingUsage;
use crate::error::FetchError;

/// Runner tag given to jobs that do not appear in the billing data.
pub const FREE_RUNNER: &str = "Free";

/// Money in tenths of a cent (thousandths of a dollar).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TenthsOfCent(pub u64);

impl Add for TenthsOfCent {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for TenthsOfCent {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|v| v.0).sum::<u64>())
    }
}

impl Display for TenthsOfCent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

/// Per-minute price of each runner class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    per_minute: HashMap<String, TenthsOfCent>,
}

impl RateTable {
    pub fn empty() -> Self {
        Self {
            per_minute: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, runner: impl Into<String>, per_minute: TenthsOfCent) -> Self {
        self.per_minute.insert(runner.into(), per_minute);
        self
    }

    pub fn rate(&self, runner: &str) -> Option<TenthsOfCent> {
        self.per_minute.get(runner).copied()
    }
}

/// Taken from:
/// https://docs.github.com/en/billing/managing-billing-for-your-products/managing-billing-for-github-actions/about-billing-for-github-actions#per-minute-rates
impl Default for RateTable {
    fn default() -> Self {
        [
            // x64
            ("UBUNTU", 8),
            ("UBUNTU_2_CORE", 8),
            ("UBUNTU_4_CORE", 16),
            ("UBUNTU_8_CORE", 32),
            ("UBUNTU_16_CORE", 64),
            ("UBUNTU_32_CORE", 128),
            ("UBUNTU_64_CORE", 256),
            // arm64
            ("UBUNTU_ARM", 5),
            ("UBUNTU_2_CORE_ARM", 5),
            ("UBUNTU_4_CORE_ARM", 10),
            ("UBUNTU_8_CORE_ARM", 20),
            ("UBUNTU_16_CORE_ARM", 40),
            ("UBUNTU_32_CORE_ARM", 80),
            ("UBUNTU_64_CORE_ARM", 160),
        ]
        .into_iter()
        .fold(Self::empty(), |table, (runner, rate)| {
            table.with_rate(runner, TenthsOfCent(rate))
        })
    }
}

/// Returns the runner class a job was billed under and what it cost.
///
/// Partial minutes are not charged. Every runner class in `billing` must have a
/// rate, even if the job ran on a different one, so that a gap in the rate
/// table is never hidden by lookup order.
pub fn job_cost(
    job_id: JobId,
    billing: &BillingUsage,
    rates: &RateTable,
) -> Result<(String, TenthsOfCent), FetchError> {
    let mut found = None;
    for (runner, job_runs) in billing.runners() {
        let Some(rate) = rates.rate(runner) else {
            return Err(FetchError::UnknownRunnerRate {
                runner: runner.to_string(),
            });
        };
        if found.is_some() {
            continue;
        }
        if let Some(run) = job_runs.iter().find(|run| run.job_id == job_id) {
            let minutes = run.duration_ms / 1000 / 60;
            found = Some((runner.to_string(), TenthsOfCent(minutes * rate.0)));
        }
    }
    Ok(found.unwrap_or_else(|| (FREE_RUNNER.to_string(), TenthsOfCent(0))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::JobBillable;

    fn billing(entries: &[(&str, u64, u64)]) -> BillingUsage {
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

    #[test]
    fn floors_to_whole_minutes() {
        let usage = billing(&[("UBUNTU_4_CORE", 1, 125_000)]);
        let (runner, cost) = job_cost(JobId(1), &usage, &RateTable::default()).unwrap();
        assert_eq!(runner, "UBUNTU_4_CORE");
        assert_eq!(cost, TenthsOfCent(32));
    }

    #[test]
    fn sub_minute_jobs_cost_nothing() {
        let usage = billing(&[("UBUNTU", 1, 59_999)]);
        let (runner, cost) = job_cost(JobId(1), &usage, &RateTable::default()).unwrap();
        assert_eq!(runner, "UBUNTU");
        assert_eq!(cost, TenthsOfCent(0));
    }

    #[test]
    fn missing_job_is_free() {
        let usage = billing(&[("UBUNTU", 1, 600_000)]);
        let (runner, cost) = job_cost(JobId(2), &usage, &RateTable::default()).unwrap();
        assert_eq!(runner, FREE_RUNNER);
        assert_eq!(cost, TenthsOfCent(0));

        let (runner, _) = job_cost(JobId(2), &BillingUsage::default(), &RateTable::default())
            .unwrap();
        assert_eq!(runner, FREE_RUNNER);
    }

    #[test]
    fn unknown_runner_fails() {
        let usage = billing(&[("UBUNTU", 1, 60_000), ("MACOS_XLARGE", 2, 60_000)]);
        let err = job_cost(JobId(1), &usage, &RateTable::default()).unwrap_err();
        assert!(
            matches!(err, FetchError::UnknownRunnerRate { ref runner } if runner == "MACOS_XLARGE")
        );
    }

    #[test]
    fn custom_rates() {
        let rates = RateTable::empty().with_rate("MACOS", TenthsOfCent(80));
        let usage = billing(&[("MACOS", 7, 3 * 60_000 + 1)]);
        assert_eq!(
            job_cost(JobId(7), &usage, &rates).unwrap(),
            ("MACOS".to_string(), TenthsOfCent(240))
        );
    }

    #[test]
    fn display_in_dollars() {
        assert_eq!(TenthsOfCent(32).to_string(), "$0.032");
        assert_eq!(TenthsOfCent(12_345).to_string(), "$12.345");
        let total: TenthsOfCent = [TenthsOfCent(8), TenthsOfCent(16)].into_iter().sum();
        assert_eq!(total, TenthsOfCent(24));
    }
}
