use super::{error_message, refresh_with_spinner, ui};
use crate::core::{ConversionResult, ConversionService};
use anyhow::Result;
use tracing::debug;

/// Converts a single amount and prints `"{amount} {source} = {converted} {target}"`.
///
/// Unless `offline` is set the rates are refreshed first; a failed refresh
/// only changes the status line, the conversion still runs on the current rates.
pub async fn run(
    service: &ConversionService,
    amount: &str,
    source: &str,
    target: &str,
    offline: bool,
) -> Result<ConversionResult> {
    if !offline {
        refresh_with_spinner(service).await;
    }
    eprintln!("{}", ui::status_text(&service.status()));

    let source = source.trim().to_ascii_uppercase();
    let target = target.trim().to_ascii_uppercase();
    debug!(%amount, %source, %target, "Converting");

    let result = service
        .convert_input(amount, &source, &target)
        .map_err(|e| {
            let message = error_message(&e);
            anyhow::Error::new(e).context(message)
        })?;

    println!(
        "{}",
        ui::style_text(&result.to_string(), ui::StyleType::Result)
    );
    Ok(result)
}
