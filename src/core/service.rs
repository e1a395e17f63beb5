//! Conversion service owning the shared rate table

use crate::core::rates::{ConversionError, ConversionResult, RateTable};
use crate::core::source::{FetchError, RateSource};
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Outcome of the latest rate refresh, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshStatus {
    Static,
    Fetching,
    Updated { count: usize },
    Unavailable,
    NetworkError(String),
    ParseError(String),
}

impl Display for RefreshStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshStatus::Static => write!(f, "Using static rates"),
            RefreshStatus::Fetching => write!(f, "Fetching real-time rates..."),
            RefreshStatus::Updated { .. } => write!(f, "Rates updated from API"),
            RefreshStatus::Unavailable => {
                write!(f, "API rates unavailable, using last known rates")
            }
            RefreshStatus::NetworkError(e) => write!(
                f,
                "Network error fetching rates: {e}. Using last known rates."
            ),
            RefreshStatus::ParseError(e) => {
                write!(f, "Error fetching rates: {e}. Using last known rates.")
            }
        }
    }
}

impl RefreshStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            RefreshStatus::NetworkError(_) | RefreshStatus::ParseError(_)
        )
    }
}

/// Owns the rate table and refreshes it from a [`RateSource`].
///
/// Cloning is cheap and every clone shares the same table and status, so a
/// clone can be moved into a background task while the front end keeps
/// converting with whatever rates are current.
#[derive(Clone)]
pub struct ConversionService {
    table: Arc<RwLock<RateTable>>,
    source: Arc<dyn RateSource>,
    status: Arc<watch::Sender<RefreshStatus>>,
    updated_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl ConversionService {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self::with_table(RateTable::new(), source)
    }

    pub fn with_table(table: RateTable, source: Arc<dyn RateSource>) -> Self {
        let (status, _) = watch::channel(RefreshStatus::Static);
        Self {
            table: Arc::new(RwLock::new(table)),
            source,
            status: Arc::new(status),
            updated_at: Arc::new(Mutex::new(None)),
        }
    }

    fn read_table(&self) -> RwLockReadGuard<'_, RateTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, RateTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current rates.
    pub fn table(&self) -> RateTable {
        self.read_table().clone()
    }

    pub fn codes(&self) -> Vec<String> {
        self.read_table().codes().map(str::to_string).collect()
    }

    pub fn convert(
        &self,
        amount: f64,
        source: &str,
        target: &str,
    ) -> Result<ConversionResult, ConversionError> {
        self.read_table().convert(amount, source, target)
    }

    pub fn convert_input(
        &self,
        input: &str,
        source: &str,
        target: &str,
    ) -> Result<ConversionResult, ConversionError> {
        self.read_table().convert_input(input, source, target)
    }

    pub fn status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.status.subscribe()
    }

    /// When a refresh last wrote at least one rate.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.updated_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches fresh rates and merges them into the table.
    ///
    /// Failures are reported through the returned status; the table is left
    /// untouched unless the source returned at least one tracked rate.
    #[instrument(name = "RateRefresh", skip(self))]
    pub async fn refresh(&self) -> RefreshStatus {
        self.status.send_replace(RefreshStatus::Fetching);

        let base = self.read_table().base().to_string();
        let status = match self.source.fetch_rates(&base).await {
            Ok(fetched) => {
                debug!(received = fetched.len(), "Merging fetched rates");
                let count = self.write_table().merge(&fetched);
                if count > 0 {
                    *self.updated_at.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(Utc::now());
                    RefreshStatus::Updated { count }
                } else {
                    RefreshStatus::Unavailable
                }
            }
            Err(FetchError::Network(e)) => RefreshStatus::NetworkError(e),
            Err(FetchError::Parse(e)) => RefreshStatus::ParseError(e),
        };

        match &status {
            RefreshStatus::Updated { count } => info!(count, "Rates refreshed"),
            other => warn!(status = %other, "Rates not refreshed"),
        }

        self.status.send_replace(status.clone());
        status
    }

    /// Runs [`ConversionService::refresh`] on a background task.
    pub fn spawn_refresh(&self) -> JoinHandle<RefreshStatus> {
        let service = self.clone();
        tokio::spawn(async move { service.refresh().await })
    }
}
