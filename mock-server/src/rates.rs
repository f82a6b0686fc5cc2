//! Exchange-rates vendor emulation.
//!
//! Rates come from a fixed EUR-based table and never change over time, so
//! cross rates, conversions and time series are deterministic. Errors use
//! the vendor shape `{success:false, error:{code, type, info}}`; some are
//! sent with a 200 status the way the real vendor does.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Map, Value};

pub const API_KEY: &str = "test-key";
/// Valid key on a plan without conversion, time-series or fluctuation access.
pub const API_KEY_FREE: &str = "free-key";
pub const API_KEY_EXHAUSTED: &str = "exhausted-key";

pub const TIMESTAMP: i64 = 1_700_000_000;

const EUR_RATES: &[(&str, &str, f64)] = &[
    ("EUR", "Euro", 1.0),
    ("USD", "United States Dollar", 1.08),
    ("GBP", "British Pound Sterling", 0.86),
    ("JPY", "Japanese Yen", 160.0),
    ("INR", "Indian Rupee", 90.0),
    ("CHF", "Swiss Franc", 0.95),
];

type Params = Query<HashMap<String, String>>;

pub fn router() -> Router {
    Router::new()
        .route("/latest", get(latest))
        .route("/convert", get(convert))
        .route("/timeseries", get(timeseries))
        .route("/fluctuation", get(fluctuation))
        .route("/symbols", get(symbols))
        .route("/{date}", get(historical))
}

fn eur_rate(code: &str) -> Option<f64> {
    EUR_RATES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, rate)| *rate)
}

fn fail(status: StatusCode, code: u16, kind: &str, info: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": {"code": code, "type": kind, "info": info}
        })),
    )
        .into_response()
}

enum Plan {
    Full,
    Free,
}

fn authorize(params: &HashMap<String, String>) -> Result<Plan, Response> {
    match params.get("access_key").map(String::as_str) {
        Some(API_KEY) => Ok(Plan::Full),
        Some(API_KEY_FREE) => Ok(Plan::Free),
        Some(API_KEY_EXHAUSTED) => Err(fail(
            StatusCode::TOO_MANY_REQUESTS,
            104,
            "usage_limit_reached",
            "Your monthly usage limit has been reached.",
        )),
        Some(_) => Err(fail(
            StatusCode::UNAUTHORIZED,
            101,
            "invalid_access_key",
            "You have not supplied a valid API Access Key.",
        )),
        None => Err(fail(
            StatusCode::UNAUTHORIZED,
            101,
            "missing_access_key",
            "You have not supplied an API Access Key.",
        )),
    }
}

fn require_full_plan(plan: Plan) -> Result<(), Response> {
    match plan {
        Plan::Full => Ok(()),
        Plan::Free => Err(fail(
            StatusCode::OK,
            105,
            "function_access_restricted",
            "The current subscription plan does not support this API endpoint.",
        )),
    }
}

/// Rates for `symbols` (all when empty) relative to `base`.
fn table(base: &str, symbols: Option<&String>) -> Result<Map<String, Value>, Response> {
    let base_rate = eur_rate(base).ok_or_else(|| {
        fail(
            StatusCode::OK,
            201,
            "invalid_base_currency",
            "An invalid base currency has been entered.",
        )
    })?;

    let wanted: Vec<&str> = match symbols {
        Some(list) if !list.is_empty() => list.split(',').collect(),
        _ => EUR_RATES.iter().map(|(c, _, _)| *c).collect(),
    };

    let mut rates = Map::new();
    for code in wanted {
        let rate = eur_rate(code).ok_or_else(|| {
            fail(
                StatusCode::OK,
                202,
                "invalid_currency_codes",
                "One or more invalid symbols have been specified.",
            )
        })?;
        rates.insert(code.to_string(), json!(rate / base_rate));
    }
    Ok(rates)
}

fn parse_date(raw: Option<&String>) -> Result<NaiveDate, Response> {
    raw.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            fail(
                StatusCode::OK,
                302,
                "invalid_date",
                "An invalid date has been specified.",
            )
        })
}

fn base_of(params: &HashMap<String, String>) -> String {
    params.get("base").cloned().unwrap_or_else(|| "EUR".to_string())
}

async fn latest(Query(params): Params) -> Response {
    let result = (|| {
        authorize(&params)?;
        let base = base_of(&params);
        let rates = table(&base, params.get("symbols"))?;
        Ok::<_, Response>(Json(json!({
            "success": true,
            "timestamp": TIMESTAMP,
            "base": base,
            "date": Utc::now().date_naive().to_string(),
            "rates": rates
        })))
    })();
    result.into_response()
}

async fn historical(Path(date): Path<String>, Query(params): Params) -> Response {
    let result = (|| {
        authorize(&params)?;
        let date = parse_date(Some(&date))?;
        let base = base_of(&params);
        let rates = table(&base, params.get("symbols"))?;
        Ok::<_, Response>(Json(json!({
            "success": true,
            "historical": true,
            "timestamp": TIMESTAMP,
            "base": base,
            "date": date.to_string(),
            "rates": rates
        })))
    })();
    result.into_response()
}

async fn convert(Query(params): Params) -> Response {
    let result = (|| {
        require_full_plan(authorize(&params)?)?;
        let from = params.get("from").cloned().unwrap_or_default();
        let to = params.get("to").cloned().unwrap_or_default();
        let amount: f64 = params
            .get("amount")
            .and_then(|a| a.parse().ok())
            .filter(|a: &f64| *a > 0.0)
            .ok_or_else(|| {
                fail(
                    StatusCode::OK,
                    403,
                    "invalid_conversion_amount",
                    "An invalid conversion amount has been specified.",
                )
            })?;
        let rates = table(&from, Some(&to))?;
        let rate = rates.get(&to).and_then(Value::as_f64).unwrap_or_default();
        let date = match params.get("date") {
            Some(raw) => parse_date(Some(raw))?,
            None => Utc::now().date_naive(),
        };
        Ok::<_, Response>(Json(json!({
            "success": true,
            "query": {"from": from, "to": to, "amount": amount},
            "info": {"timestamp": TIMESTAMP, "rate": rate},
            "historical": params.contains_key("date"),
            "date": date.to_string(),
            "result": amount * rate
        })))
    })();
    result.into_response()
}

fn date_range(params: &HashMap<String, String>) -> Result<(NaiveDate, NaiveDate), Response> {
    let start = parse_date(params.get("start_date"))?;
    let end = parse_date(params.get("end_date"))?;
    if end < start || (end - start).num_days() > 365 {
        return Err(fail(
            StatusCode::OK,
            505,
            "invalid_time_frame",
            "The specified timeframe is invalid.",
        ));
    }
    Ok((start, end))
}

async fn timeseries(Query(params): Params) -> Response {
    let result = (|| {
        require_full_plan(authorize(&params)?)?;
        let (start, end) = date_range(&params)?;
        let base = base_of(&params);
        let rates = table(&base, params.get("symbols"))?;
        let mut days = BTreeMap::new();
        let mut day = start;
        while day <= end {
            days.insert(day.to_string(), Value::Object(rates.clone()));
            day += Duration::days(1);
        }
        Ok::<_, Response>(Json(json!({
            "success": true,
            "timeseries": true,
            "start_date": start.to_string(),
            "end_date": end.to_string(),
            "base": base,
            "rates": days
        })))
    })();
    result.into_response()
}

async fn fluctuation(Query(params): Params) -> Response {
    let result = (|| {
        require_full_plan(authorize(&params)?)?;
        let (start, end) = date_range(&params)?;
        let base = base_of(&params);
        let rates = table(&base, params.get("symbols"))?;
        let changes: Map<String, Value> = rates
            .into_iter()
            .map(|(code, rate)| {
                let entry = json!({
                    "start_rate": rate,
                    "end_rate": rate,
                    "change": 0.0,
                    "change_pct": 0.0
                });
                (code, entry)
            })
            .collect();
        Ok::<_, Response>(Json(json!({
            "success": true,
            "fluctuation": true,
            "start_date": start.to_string(),
            "end_date": end.to_string(),
            "base": base,
            "rates": changes
        })))
    })();
    result.into_response()
}

async fn symbols(Query(params): Params) -> Response {
    if let Err(rejection) = authorize(&params) {
        return rejection;
    }
    let symbols: Map<String, Value> = EUR_RATES
        .iter()
        .map(|(code, name, _)| (code.to_string(), json!(name)))
        .collect();
    Json(json!({"success": true, "symbols": symbols})).into_response()
}
