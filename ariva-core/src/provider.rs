//! Price source trait and structured error types.
//!
//! The PriceSource trait is the contract a host framework drives: latest price,
//! price at a point in time, and a price series, all keyed by a ticker string.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency every ariva.de export is quoted in.
pub const QUOTE_CURRENCY: &str = "EUR";

/// Number of fractional digits every parsed price carries.
pub const PRICE_SCALE: u32 = 7;

/// A single closing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Decimal,
    /// Midnight UTC of the quoted trading day.
    pub time: DateTime<Utc>,
    pub quote_currency: String,
}

impl PricePoint {
    /// Closing price for a calendar date, stamped at UTC midnight.
    pub fn on_date(price: Decimal, date: NaiveDate) -> Self {
        Self {
            price,
            time: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            quote_currency: QUOTE_CURRENCY.to_string(),
        }
    }

    /// Calendar date this price was quoted on.
    pub fn date(&self) -> NaiveDate {
        self.time.date_naive()
    }
}

/// Structured error types for price lookups.
///
/// None of these are retried internally; each one ends the call that raised it.
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid ticker: {0}")]
    Format(String),

    #[error("export request failed: {0}")]
    Fetch(String),

    #[error("malformed export data: {0}")]
    Parse(String),
}

/// Host-facing price source.
///
/// `Ok(None)` means the provider had no prices for the request; it is never used
/// to mask an error.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Most recent closing price available.
    fn get_latest_price(&self, ticker: &str) -> Result<Option<PricePoint>, PriceError>;

    /// Closing price on the calendar day of `time`.
    fn get_historical_price(
        &self,
        ticker: &str,
        time: DateTime<Utc>,
    ) -> Result<Option<PricePoint>, PriceError>;

    /// Closing prices between the days of `begin` and `end`, both inclusive.
    fn get_prices_series(
        &self,
        ticker: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Vec<PricePoint>>, PriceError>;
}
