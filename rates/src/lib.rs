//! Typed client for an exchange-rates API: latest and historical rates,
//! conversion, time series, fluctuation and the supported symbol list.
//!
//! Currency arguments are case-insensitive; they are normalized to
//! uppercase three-letter codes before any request is built.

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod types;

pub use client::RatesClient;
pub use config::{RatesConfig, RatesEnvironment};
pub use error::{RatesError, RatesErrorCode};
pub use types::{
    Conversion, ConversionInfo, ConversionQuery, Fluctuation, RateChange, RateTable, Rates, Symbols,
    TimeSeries,
};
