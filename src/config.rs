use std::time::Duration;

use crate::cost::RateTable;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_JOBS_PER_PAGE: u8 = 100;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Settings shared by every remote call of a run fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Budget of each individual remote call.
    pub timeout: Duration,
    pub jobs_per_page: u8,
    pub rates: RateTable,
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            jobs_per_page: DEFAULT_JOBS_PER_PAGE,
            rates: RateTable::default(),
        }
    }
}
