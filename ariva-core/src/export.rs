//! Historical price export: request construction and CSV parsing.
//!
//! The export is a `;`-delimited table with German number formatting
//! (`1.234,5`). Only the `Datum` and `Schlusskurs` columns are used. Rows are
//! re-checked against the requested range even though the server was asked to
//! filter already.

use crate::config::SourceConfig;
use crate::domain::DateRange;
use crate::http_client::HttpRequest;
use crate::provider::{PriceError, PricePoint, PRICE_SCALE};
use crate::session::Session;
use crate::ticker::TickerKey;
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub const DATE_COLUMN: &str = "Datum";
pub const CLOSE_COLUMN: &str = "Schlusskurs";

/// Longest body excerpt carried in a fetch error.
const ERROR_BODY_EXCERPT: usize = 200;

/// Fetches and parses the historical export for one instrument.
#[derive(Debug, Clone)]
pub struct PriceSeriesFetcher {
    export_url: String,
}

impl PriceSeriesFetcher {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            export_url: config.export_url(),
        }
    }

    pub fn fetch(
        &self,
        session: &Session,
        key: &TickerKey,
        range: DateRange,
    ) -> Result<Vec<PricePoint>, PriceError> {
        let request = HttpRequest::get(&self.export_url).with_query(export_query(key, range));
        debug!("requesting export for {key} ({range:?})");

        let response = session
            .client()
            .execute(request)
            .map_err(|e| {
                PriceError::Fetch(format!("transport error for {key}: {}", e.message()))
            })?;

        if response.status != 200 {
            return Err(PriceError::Fetch(format!(
                "invalid response ({}) for {key}: {}",
                response.status,
                excerpt(&response.body)
            )));
        }

        if !response.content_type.as_deref().is_some_and(is_csv_content_type) {
            return Err(PriceError::Fetch(format!(
                "unexpected response content type {:?} for {key}",
                response.content_type.as_deref().unwrap_or("<none>")
            )));
        }

        parse_export(&response.body, range)
    }
}

/// Query string for the export endpoint.
///
/// Prices are requested split-, payout- and subscription-right-adjusted. A
/// missing range bound omits its parameter instead of sending an extreme date.
pub fn export_query(key: &TickerKey, range: DateRange) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = [
        ("secu", key.symbol_id.as_str()),
        ("boerse_id", key.market_id.as_str()),
        ("clean_split", "1"),
        ("clean_payout", "1"),
        ("clean_bezug", "1"),
        ("trenner", ";"),
        ("go", "Download"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    if let Some(begin) = range.begin {
        query.push(("min_time".into(), begin.format("%d.%m.%Y").to_string()));
    }
    if let Some(end) = range.end {
        query.push(("max_time".into(), end.format("%d.%m.%Y").to_string()));
    }
    query
}

/// The export is only trusted when served as plain `text/csv`.
pub fn is_csv_content_type(content_type: &str) -> bool {
    content_type == "text/csv"
}

/// Parse an export body into price points inside `range`, in server order.
///
/// Every date must parse; prices are only read for rows inside the range.
pub fn parse_export(body: &str, range: DateRange) -> Result<Vec<PricePoint>, PriceError> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PriceError::Parse(format!("unreadable header row: {e}")))?
        .clone();
    let date_idx = column_index(&headers, DATE_COLUMN)?;
    let close_idx = column_index(&headers, CLOSE_COLUMN)?;

    let mut points = Vec::new();
    let mut discarded = 0usize;

    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record =
            record.map_err(|e| PriceError::Parse(format!("row {row}: unreadable record: {e}")))?;

        let date = parse_date(field(&record, date_idx, DATE_COLUMN, row)?)
            .map_err(|e| PriceError::Parse(format!("row {row}: {e}")))?;
        if !range.contains(date) {
            discarded += 1;
            continue;
        }

        let price = parse_locale_decimal(field(&record, close_idx, CLOSE_COLUMN, row)?)
            .map_err(|e| PriceError::Parse(format!("row {row}: {e}")))?;
        points.push(PricePoint::on_date(price, date));
    }

    if discarded > 0 {
        warn!("discarded {discarded} export rows outside {range:?}");
    }
    Ok(points)
}

/// Strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date {value:?}: {e}"))
}

/// Convert a German-formatted decimal (`1.234,5`) to a non-negative price with
/// exactly seven fractional digits, rounding half away from zero.
///
/// When a comma is present it is the decimal separator and dots are digit
/// grouping; without a comma the text is read as-is.
pub fn parse_locale_decimal(value: &str) -> Result<Decimal, String> {
    let trimmed = value.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    let parsed =
        Decimal::from_str(&normalized).map_err(|e| format!("invalid decimal {value:?}: {e}"))?;
    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(format!("negative price {value:?}"));
    }

    let mut price = parsed.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(PRICE_SCALE);
    price.set_sign_positive(true);
    Ok(price)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, PriceError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PriceError::Parse(format!("export has no {name:?} column")))
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<&'r str, PriceError> {
    record
        .get(idx)
        .ok_or_else(|| PriceError::Parse(format!("row {row}: missing {name:?} field")))
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
