//! Exchange-rates connect against the emulated vendor.
//!
//! # Design
//! The first test drives the `build_*` / `parse_*` halves over a blocking
//! ureq round-trip, the way a host that owns its own HTTP stack would. The
//! remaining tests use the async client with the reqwest transport.

use chrono::{Duration, NaiveDate, Utc};
use connect_core::{HttpMethod, HttpRequest, HttpResponse};
use mock_server::rates::{API_KEY, API_KEY_EXHAUSTED, API_KEY_FREE, TIMESTAMP};
use rates_connect::{RatesClient, RatesConfig, RatesEnvironment, RatesErrorCode};

/// Execute an `HttpRequest` with ureq, returning error statuses as data.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let url = req.url().unwrap();
    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(url.as_str()).call(),
        (HttpMethod::Delete, _) => agent.delete(url.as_str()).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(url.as_str())
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(url.as_str()).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(url.as_str())
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(url.as_str()).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().unwrap_or_default();
    HttpResponse::from_text(status, Vec::new(), &text)
}

/// Start the mock server on its own thread and return the rates base URL.
fn spawn_blocking_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/rates")
}

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}/rates")
}

async fn client(key: &str) -> RatesClient {
    let base = spawn_server().await;
    RatesClient::with_reqwest(RatesConfig::new(RatesEnvironment::Custom(base), key).unwrap())
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn host_driven_round_trip() {
    let base = spawn_blocking_server();
    let config = RatesConfig::new(RatesEnvironment::Custom(base), API_KEY).unwrap();
    let client = RatesClient::with_reqwest(config);

    // Latest rates for two symbols against USD.
    let req = client.build_latest_rates(Some("usd"), &["eur", "gbp"]).unwrap();
    let rates = client.parse_latest_rates(execute(req)).unwrap();
    assert_eq!(rates.base, "USD");
    assert_eq!(rates.rates.len(), 2);
    assert!((rates.rate("EUR").unwrap() - 1.0 / 1.08).abs() < 1e-9);
    assert_eq!(rates.as_of().unwrap().timestamp(), TIMESTAMP);

    // Conversion with lowercase codes.
    let req = client.build_convert(100.0, "usd", "eur", None).unwrap();
    let conversion = client.parse_convert(execute(req)).unwrap();
    assert_eq!(conversion.query.from, "USD");
    assert_eq!(conversion.query.to, "EUR");
    assert!((conversion.result - 100.0 / 1.08).abs() < 1e-9);

    // Historical rates keep the requested date.
    let date = day(2024, 2, 29);
    let req = client.build_historical_rates(date, None, &["jpy"]).unwrap();
    let historical = client.parse_historical_rates(date, execute(req)).unwrap();
    assert!(historical.historical);
    assert_eq!(historical.date, date);
    assert_eq!(historical.rate("JPY"), Some(160.0));

    // The vendor rejects an unknown symbol inside a 200 response.
    let req = client.build_latest_rates(None, &["xyz"]).unwrap();
    let err = client.parse_latest_rates(execute(req)).unwrap_err();
    assert_eq!(err.code(), RatesErrorCode::InvalidCurrencyCodes);
}

#[tokio::test]
async fn time_series_covers_every_day() {
    let rates = client(API_KEY).await;
    let series = rates
        .time_series(day(2024, 1, 1), day(2024, 1, 7), Some("EUR"), &["USD"])
        .await
        .unwrap();
    assert_eq!(series.rates.len(), 7);
    assert!(series.rates.values().all(|table| table["USD"] == 1.08));
}

#[tokio::test]
async fn fluctuation_reports_each_symbol() {
    let rates = client(API_KEY).await;
    let fluctuation = rates
        .fluctuation(day(2024, 1, 1), day(2024, 1, 31), None, &["usd", "chf"])
        .await
        .unwrap();
    assert_eq!(fluctuation.rates.len(), 2);
    assert_eq!(fluctuation.rates["CHF"].start_rate, 0.95);
}

#[tokio::test]
async fn supported_symbols_lists_the_table() {
    let rates = client(API_KEY).await;
    let symbols = rates.supported_symbols().await.unwrap();
    assert_eq!(symbols.symbols["INR"], "Indian Rupee");
}

#[tokio::test]
async fn historical_conversion_uses_the_date() {
    let rates = client(API_KEY).await;
    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let conversion = rates.convert(10.0, "gbp", "usd", Some(yesterday)).await.unwrap();
    assert!(conversion.historical);
    assert_eq!(conversion.date, yesterday);
}

#[tokio::test]
async fn free_plan_cannot_convert() {
    let rates = client(API_KEY_FREE).await;
    let err = rates.convert(1.0, "EUR", "USD", None).await.unwrap_err();
    assert_eq!(err.code(), RatesErrorCode::FunctionAccessRestricted);
    assert_eq!(err.metadata()["status_code"], serde_json::json!(200));
}

#[tokio::test]
async fn account_failures_map_to_codes() {
    let cases = [
        (API_KEY_EXHAUSTED, RatesErrorCode::RateLimitExceeded),
        ("stolen-key", RatesErrorCode::InvalidApiKey),
    ];
    for (key, expected) in cases {
        let rates = client(key).await;
        let err = rates.latest_rates(None, &[]).await.unwrap_err();
        assert_eq!(err.code(), expected, "key {key}");
    }
}

#[tokio::test]
async fn invalid_base_is_reported_by_vendor() {
    let rates = client(API_KEY).await;
    let err = rates.latest_rates(Some("ZZZ"), &[]).await.unwrap_err();
    assert_eq!(err.code(), RatesErrorCode::InvalidBaseCurrency);
    assert_eq!(err.metadata()["vendor_message"], serde_json::json!("invalid_base_currency"));
}
