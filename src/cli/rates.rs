use super::{refresh_with_spinner, ui};
use crate::core::{ConversionService, RateTable, RefreshStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

/// Renders the rate table with the refresh status underneath.
pub fn render(
    table: &RateTable,
    status: &RefreshStatus,
    last_updated: Option<DateTime<Utc>>,
) -> String {
    let mut rates = ui::new_styled_table();
    rates.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {})", table.base())),
    ]);

    for (code, rate) in table.iter() {
        rates.add_row(vec![Cell::new(code), ui::rate_cell(rate)]);
    }

    let last_updated = last_updated.map_or("never".to_string(), |ts| {
        ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    });

    format!(
        "{}\n\n{}\n\n{}\n{}",
        ui::style_text("Exchange Rates", ui::StyleType::Title),
        rates,
        ui::status_text(status),
        ui::style_text(
            &format!("Last updated: {last_updated}"),
            ui::StyleType::Subtle
        ),
    )
}

pub async fn run(service: &ConversionService, offline: bool) -> Result<()> {
    if !offline {
        refresh_with_spinner(service).await;
    }
    println!(
        "{}",
        render(&service.table(), &service.status(), service.last_updated())
    );
    Ok(())
}
