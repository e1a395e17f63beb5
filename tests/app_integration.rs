use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use fxconv::core::{ConversionService, RateTable, RefreshStatus};
use fxconv::providers::ExchangeRateHostProvider;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_rates_server(mock_response: &str) -> MockServer {
        create_mock_server(ResponseTemplate::new(200).set_body_string(mock_response)).await
    }

    pub fn write_config(base_url: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
            provider:
              base_url: {base_url}
              timeout_secs: 5
            "#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

fn service_for(base_url: &str, timeout: Duration) -> ConversionService {
    let provider = ExchangeRateHostProvider::new(base_url, timeout).unwrap();
    ConversionService::new(Arc::new(provider))
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_rates_server(
        r#"{"base": "USD", "rates": {"EUR": 0.92, "INR": 83.1, "JPY": 151.2}}"#,
    )
    .await;
    let config_file = test_utils::write_config(&mock_server.uri());
    let config_path = config_file.path().to_str().unwrap();

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: "usd".to_string(),
            to: "eur".to_string(),
            offline: false,
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    let result =
        fxconv::run_command(fxconv::AppCommand::Rates { offline: false }, Some(config_path)).await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_bad_amount() {
    let mock_server = test_utils::create_rates_server(r#"{"rates": {}}"#).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "abc".to_string(),
            from: "USD".to_string(),
            to: "EUR".to_string(),
            offline: true,
        },
        config_file.path().to_str(),
    )
    .await;

    let err = result.expect_err("Conversion of a non-numeric amount should fail");
    assert_eq!(err.to_string(), "Please enter a valid numeric amount.");
}

#[test_log::test(tokio::test)]
async fn test_missing_config_path_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("config.yaml");

    let result = fxconv::run_command(
        fxconv::AppCommand::Rates { offline: true },
        missing.to_str(),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_refresh_updates_only_returned_rate() {
    let mock_server = test_utils::create_rates_server(r#"{"rates": {"EUR": 0.90}}"#).await;
    let service = service_for(&mock_server.uri(), Duration::from_secs(5));
    let before = service.table();

    let status = service.refresh().await;
    info!(?status, "Refreshed");

    assert_eq!(status, RefreshStatus::Updated { count: 1 });
    let after = service.table();
    assert_eq!(after.get("EUR"), Some(0.90));
    for (code, rate) in before.iter().filter(|(code, _)| *code != "EUR") {
        assert_eq!(after.get(code), Some(rate), "{code} changed");
    }

    let result = service.convert(100.0, "USD", "EUR").unwrap();
    assert_eq!(result.to_string(), "100.00 USD = 90.00 EUR");
}

#[test_log::test(tokio::test)]
async fn test_refresh_ignores_null_rate_for_untracked_code() {
    let mock_server =
        test_utils::create_rates_server(r#"{"rates": {"EUR": 0.90, "VEF": null}}"#).await;
    let service = service_for(&mock_server.uri(), Duration::from_secs(5));

    let status = service.refresh().await;

    assert_eq!(status, RefreshStatus::Updated { count: 1 });
    assert_eq!(service.table().get("EUR"), Some(0.90));
}

#[test_log::test(tokio::test)]
async fn test_refresh_timeout_keeps_rates() {
    let mock_server = test_utils::create_mock_server(
        wiremock::ResponseTemplate::new(200)
            .set_body_string(r#"{"rates": {"EUR": 0.5}}"#)
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    let service = service_for(&mock_server.uri(), Duration::from_millis(100));

    let status = service.refresh().await;

    assert!(matches!(status, RefreshStatus::NetworkError(_)), "{status:?}");
    assert_eq!(service.table(), RateTable::new());
    assert_eq!(service.status(), status);
}

#[test_log::test(tokio::test)]
async fn test_refresh_server_error_keeps_rates() {
    let mock_server =
        test_utils::create_mock_server(wiremock::ResponseTemplate::new(503)).await;
    let service = service_for(&mock_server.uri(), Duration::from_secs(5));

    let status = service.refresh().await;

    assert_eq!(
        status,
        RefreshStatus::NetworkError("HTTP error: 503 Service Unavailable".to_string())
    );
    assert_eq!(service.table(), RateTable::new());
}

#[test_log::test(tokio::test)]
async fn test_refresh_malformed_body_keeps_rates() {
    let mock_server = test_utils::create_rates_server("<html>not json</html>").await;
    let service = service_for(&mock_server.uri(), Duration::from_secs(5));

    let status = service.refresh().await;

    assert!(matches!(status, RefreshStatus::ParseError(_)), "{status:?}");
    assert_eq!(service.table(), RateTable::new());
}

#[test_log::test(tokio::test)]
async fn test_background_refresh_does_not_block_conversion() {
    let mock_server = test_utils::create_mock_server(
        wiremock::ResponseTemplate::new(200)
            .set_body_string(r#"{"rates": {"EUR": 0.5}}"#)
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    let service = service_for(&mock_server.uri(), Duration::from_secs(5));

    let handle = service.spawn_refresh();

    // Static rates stay usable while the fetch is in flight
    let result = service.convert(100.0, "USD", "EUR").unwrap();
    assert_eq!(result.to_string(), "100.00 USD = 85.00 EUR");

    let status = handle.await.unwrap();
    assert_eq!(status, RefreshStatus::Updated { count: 1 });
    let result = service.convert(100.0, "USD", "EUR").unwrap();
    assert_eq!(result.to_string(), "100.00 USD = 50.00 EUR");
}

#[test]
fn test_example_config_is_valid_yaml() {
    let example = fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/docs/example_config.yaml"
    ))
    .unwrap();
    let config: fxconv::core::config::AppConfig = serde_yaml::from_str(&example).unwrap();
    assert_eq!(config, fxconv::core::config::AppConfig::default());
}
