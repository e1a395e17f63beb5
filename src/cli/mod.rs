pub mod convert;
pub mod interactive;
pub mod rates;
pub mod setup;
pub mod ui;

use crate::core::{ConversionError, ConversionService, RefreshStatus};

/// Message shown to the user when a conversion is rejected.
pub fn error_message(error: &ConversionError) -> &'static str {
    match error {
        ConversionError::InvalidAmount(_) => "Please enter a valid numeric amount.",
        ConversionError::InvalidCurrency(_) => "Invalid currency selected.",
    }
}

/// Refreshes the rates in the foreground with a spinner.
pub async fn refresh_with_spinner(service: &ConversionService) -> RefreshStatus {
    let pb = ui::new_spinner(&RefreshStatus::Fetching.to_string());
    let status = service.refresh().await;
    pb.finish_and_clear();
    status
}
