//! Exchange-rates client.
//!
//! # Design
//! Same `build_*` / `parse_*` split as the other connects. All operations
//! are GET requests; the API key travels as the `access_key` query
//! parameter and currency arguments are normalized before they are placed
//! in the query.

use chrono::NaiveDate;
use connect_core::mapping::{call, interpret};
use connect_core::{HttpRequest, HttpResponse, RequestBuilder, ReqwestTransport, Transport, Validate};
use serde::de::DeserializeOwned;

use crate::config::RatesConfig;
use crate::error::{RatesError, PROFILE};
use crate::input;
use crate::types::{Conversion, Fluctuation, Rates, Symbols, TimeSeries};

pub const LATEST_PATH: &str = "/latest";
pub const CONVERT_PATH: &str = "/convert";
pub const TIMESERIES_PATH: &str = "/timeseries";
pub const FLUCTUATION_PATH: &str = "/fluctuation";
pub const SYMBOLS_PATH: &str = "/symbols";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct RatesClient<T = ReqwestTransport> {
    config: RatesConfig,
    transport: T,
}

impl RatesClient<ReqwestTransport> {
    pub fn with_reqwest(config: RatesConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> RatesClient<T> {
    pub fn new(config: RatesConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RatesConfig {
        &self.config
    }

    fn get(&self, path: &str) -> RequestBuilder {
        RequestBuilder::get(self.config.base_url(), path)
            .query("access_key", self.config.api_key())
            .timeout(self.config.timeout())
    }

    /// Base currency (optional) and symbol list shared by the rate queries.
    fn rate_query(&self, path: &str, base: Option<&str>, symbols: &[&str]) -> Result<RequestBuilder, RatesError> {
        let base = base.map(|b| input::currency("base", b)).transpose()?;
        let symbols = input::symbols(symbols)?;
        Ok(self
            .get(path)
            .query_opt("base", base)
            .query_list("symbols", symbols))
    }

    async fn execute<R>(&self, request: HttpRequest) -> Result<R, RatesError>
    where
        R: DeserializeOwned + Validate,
    {
        call(&self.transport, &PROFILE, request).await
    }

    pub fn build_latest_rates(&self, base: Option<&str>, symbols: &[&str]) -> Result<HttpRequest, RatesError> {
        Ok(self.rate_query(LATEST_PATH, base, symbols)?.build())
    }

    pub fn parse_latest_rates(&self, response: HttpResponse) -> Result<Rates, RatesError> {
        interpret(&PROFILE, LATEST_PATH, response)
    }

    /// Latest rates against `base` (the vendor default when `None`). An empty
    /// `symbols` slice asks for every supported currency.
    pub async fn latest_rates(&self, base: Option<&str>, symbols: &[&str]) -> Result<Rates, RatesError> {
        let request = self
            .build_latest_rates(base, symbols)
            .map_err(|e| e.annotate("endpoint", LATEST_PATH))?;
        self.execute(request).await
    }

    pub fn build_historical_rates(
        &self,
        date: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<HttpRequest, RatesError> {
        let path = format!("/{}", date.format(DATE_FORMAT));
        Ok(self.rate_query(&path, base, symbols)?.build())
    }

    pub fn parse_historical_rates(&self, date: NaiveDate, response: HttpResponse) -> Result<Rates, RatesError> {
        interpret(&PROFILE, &format!("/{}", date.format(DATE_FORMAT)), response)
    }

    pub async fn historical_rates(
        &self,
        date: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<Rates, RatesError> {
        let request = self
            .build_historical_rates(date, base, symbols)
            .map_err(|e| e.annotate("endpoint", format!("/{}", date.format(DATE_FORMAT))))?;
        self.execute(request).await
    }

    pub fn build_convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> Result<HttpRequest, RatesError> {
        let amount = input::amount(amount)?;
        let from = input::currency("from", from)?;
        let to = input::currency("to", to)?;
        Ok(self
            .get(CONVERT_PATH)
            .query("from", from)
            .query("to", to)
            .query("amount", amount.to_string())
            .query_opt("date", date.map(|d| d.format(DATE_FORMAT).to_string()))
            .build())
    }

    pub fn parse_convert(&self, response: HttpResponse) -> Result<Conversion, RatesError> {
        interpret(&PROFILE, CONVERT_PATH, response)
    }

    /// Convert `amount` of `from` into `to`, at `date` when given.
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        date: Option<NaiveDate>,
    ) -> Result<Conversion, RatesError> {
        let request = self
            .build_convert(amount, from, to, date)
            .map_err(|e| e.annotate("endpoint", CONVERT_PATH))?;
        self.execute(request).await
    }

    fn ranged(
        &self,
        path: &str,
        start: NaiveDate,
        end: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<HttpRequest, RatesError> {
        let (start, end) = input::date_range(start, end)?;
        Ok(self
            .rate_query(path, base, symbols)?
            .query("start_date", start.format(DATE_FORMAT).to_string())
            .query("end_date", end.format(DATE_FORMAT).to_string())
            .build())
    }

    pub fn build_time_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<HttpRequest, RatesError> {
        self.ranged(TIMESERIES_PATH, start, end, base, symbols)
    }

    pub fn parse_time_series(&self, response: HttpResponse) -> Result<TimeSeries, RatesError> {
        interpret(&PROFILE, TIMESERIES_PATH, response)
    }

    pub async fn time_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<TimeSeries, RatesError> {
        let request = self
            .build_time_series(start, end, base, symbols)
            .map_err(|e| e.annotate("endpoint", TIMESERIES_PATH))?;
        self.execute(request).await
    }

    pub fn build_fluctuation(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<HttpRequest, RatesError> {
        self.ranged(FLUCTUATION_PATH, start, end, base, symbols)
    }

    pub fn parse_fluctuation(&self, response: HttpResponse) -> Result<Fluctuation, RatesError> {
        interpret(&PROFILE, FLUCTUATION_PATH, response)
    }

    pub async fn fluctuation(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        base: Option<&str>,
        symbols: &[&str],
    ) -> Result<Fluctuation, RatesError> {
        let request = self
            .build_fluctuation(start, end, base, symbols)
            .map_err(|e| e.annotate("endpoint", FLUCTUATION_PATH))?;
        self.execute(request).await
    }

    pub fn build_supported_symbols(&self) -> HttpRequest {
        self.get(SYMBOLS_PATH).build()
    }

    pub fn parse_supported_symbols(&self, response: HttpResponse) -> Result<Symbols, RatesError> {
        interpret(&PROFILE, SYMBOLS_PATH, response)
    }

    pub async fn supported_symbols(&self) -> Result<Symbols, RatesError> {
        self.execute(self.build_supported_symbols()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatesEnvironment;
    use crate::error::RatesErrorCode;
    use connect_core::{HttpMethod, RecordingTransport};
    use serde_json::json;

    const BASE: &str = "http://rates.test/v1";

    fn client(transport: RecordingTransport) -> RatesClient<RecordingTransport> {
        let config = RatesConfig::new(RatesEnvironment::Custom(BASE.to_string()), "key-1").unwrap();
        RatesClient::new(config, transport)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn convert_uppercases_currency_codes() {
        let req = client(RecordingTransport::new())
            .build_convert(100.0, "usd", "eur", None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.endpoint(), "/convert");
        assert_eq!(req.query_value("from"), Some("USD"));
        assert_eq!(req.query_value("to"), Some("EUR"));
        assert_eq!(req.query_value("amount"), Some("100"));
        assert_eq!(req.query_value("access_key"), Some("key-1"));
        assert_eq!(req.query_value("date"), None);
    }

    #[test]
    fn latest_joins_symbols_and_omits_missing_base() {
        let req = client(RecordingTransport::new())
            .build_latest_rates(None, &["usd", "gbp"])
            .unwrap();
        assert_eq!(req.query_value("symbols"), Some("USD,GBP"));
        assert_eq!(req.query_value("base"), None);
    }

    #[test]
    fn historical_path_is_the_date() {
        let req = client(RecordingTransport::new())
            .build_historical_rates(day(2024, 3, 5), Some("gbp"), &[])
            .unwrap();
        assert_eq!(req.path, format!("{BASE}/2024-03-05"));
        assert_eq!(req.query_value("base"), Some("GBP"));
        assert_eq!(req.query_value("symbols"), None);
    }

    #[test]
    fn time_series_rejects_reversed_range_locally() {
        let err = client(RecordingTransport::new())
            .build_time_series(day(2024, 2, 1), day(2024, 1, 1), None, &[])
            .unwrap_err();
        assert_eq!(err.code(), RatesErrorCode::InvalidInput);
    }

    #[test]
    fn fluctuation_carries_both_dates() {
        let req = client(RecordingTransport::new())
            .build_fluctuation(day(2024, 1, 1), day(2024, 1, 31), Some("eur"), &["usd"])
            .unwrap();
        assert_eq!(req.query_value("start_date"), Some("2024-01-01"));
        assert_eq!(req.query_value("end_date"), Some("2024-01-31"));
    }

    #[tokio::test]
    async fn convert_resolves_result() {
        let transport = RecordingTransport::replying(
            200,
            json!({
                "success": true,
                "query": {"from": "USD", "to": "EUR", "amount": 100},
                "info": {"timestamp": 1_700_000_000, "rate": 0.92},
                "date": "2024-01-01",
                "result": 92.0
            }),
        );
        let conversion = client(transport).convert(100.0, "usd", "eur", None).await.unwrap();
        assert_eq!(conversion.result, 92.0);
        assert_eq!(conversion.query.from, "USD");
    }

    #[tokio::test]
    async fn success_false_with_200_maps_error_type() {
        let transport = RecordingTransport::replying(
            200,
            json!({"success": false, "error": {"code": 201, "type": "invalid_base_currency"}}),
        );
        let err = client(transport).latest_rates(Some("xyz"), &[]).await.unwrap_err();
        assert_eq!(err.code(), RatesErrorCode::InvalidBaseCurrency);
        assert_eq!(err.metadata()["status_code"], json!(200));
        assert_eq!(err.metadata()["endpoint"], json!("/latest"));
    }

    #[tokio::test]
    async fn plan_restriction_names_endpoint() {
        let transport = RecordingTransport::replying(
            200,
            json!({"success": false, "error": {"code": 105, "type": "function_access_restricted"}}),
        );
        let err = client(transport)
            .time_series(day(2024, 1, 1), day(2024, 1, 2), None, &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), RatesErrorCode::FunctionAccessRestricted);
        assert_eq!(err.message(), "exchange-rates plan does not include /timeseries");
    }

    #[tokio::test]
    async fn malformed_rates_body_is_invalid_response() {
        let transport = RecordingTransport::replying(200, json!({"success": true, "rates": "soon"}));
        let err = client(transport).latest_rates(None, &[]).await.unwrap_err();
        assert_eq!(err.code(), RatesErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn invalid_amount_is_caught_before_sending() {
        let rates = client(RecordingTransport::new());
        let err = rates.convert(-5.0, "USD", "EUR", None).await.unwrap_err();
        assert_eq!(err.code(), RatesErrorCode::InvalidInput);
        assert!(rates.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn rejected_input_names_the_endpoint() {
        let rates = client(RecordingTransport::new());
        let err = rates.convert(1.0, "usd1", "EUR", None).await.unwrap_err();
        assert_eq!(err.metadata()["endpoint"], json!(CONVERT_PATH));

        let err = rates
            .historical_rates(day(2024, 1, 2), Some("??"), &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), RatesErrorCode::InvalidInput);
        assert_eq!(err.metadata()["endpoint"], json!("/2024-01-02"));
    }
}
