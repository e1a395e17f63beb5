//! Remote rate source abstraction

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Parse(String),
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches rates quoted as units of each currency per one unit of `base`.
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>, FetchError>;
}
