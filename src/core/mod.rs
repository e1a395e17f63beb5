//! Core conversion logic and abstractions

pub mod config;
pub mod log;
pub mod rates;
pub mod service;
pub mod source;

// Re-export main types for cleaner imports
pub use rates::{ConversionError, ConversionResult, RateTable};
pub use service::{ConversionService, RefreshStatus};
pub use source::{FetchError, RateSource};
