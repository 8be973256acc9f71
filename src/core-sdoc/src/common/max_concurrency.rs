use std::num::ParseIntError;

use thiserror::Error;

/// Name of the env var holding the process-wide browser session limit.
pub const ENV_VAR: &str = "MAX_CONCURRENT_CRAWLS";

/// Default number of fetches allowed in flight at once.
pub const DEFAULT: usize = 2;

/// Retrieves the maximum number of concurrent crawls, falling back to `DEFAULT` when the env var is unset.
/// Uses `usize` because the value sizes a semaphore.
pub fn max_concurrent_crawls() -> Result<usize, MaxConcurrencyError> {
    match std::env::var(ENV_VAR) {
        Ok(v) => parse_max_concurrency(&v),
        Err(_) => Ok(DEFAULT),
    }
}

/// Parses a concurrency limit, which must be a positive integer.
pub fn parse_max_concurrency(value: &str) -> Result<usize, MaxConcurrencyError> {
    match value.trim().parse::<usize>()? {
        0 => Err(MaxConcurrencyError::NonPositive),
        n => Ok(n),
    }
}

#[derive(Debug, Error)]
pub enum MaxConcurrencyError {
    #[error("Failed to parse MAX_CONCURRENT_CRAWLS as an integer: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("MAX_CONCURRENT_CRAWLS must be a positive number")]
    NonPositive,
}
