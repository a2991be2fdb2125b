//! Rendering price points as a table, CSV or JSON.

use anyhow::{Context, Result};
use ariva_core::PricePoint;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

pub fn render(points: &[PricePoint], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(points)),
        OutputFormat::Csv => render_csv(points),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(points)
                .context("failed to serialize prices to JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_table(points: &[PricePoint]) -> String {
    let mut out = format!("{:<12} {:>18} {}\n", "date", "close", "currency");
    for p in points {
        out.push_str(&format!(
            "{:<12} {:>18} {}\n",
            p.date().to_string(),
            p.price.to_string(),
            p.quote_currency
        ));
    }
    out
}

/// Columns: date, close, currency
fn render_csv(points: &[PricePoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "close", "currency"])?;
    for p in points {
        wtr.write_record([
            p.date().to_string().as_str(),
            p.price.to_string().as_str(),
            p.quote_currency.as_str(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariva_core::export::parse_locale_decimal;
    use chrono::NaiveDate;

    fn points() -> Vec<PricePoint> {
        vec![
            PricePoint::on_date(
                parse_locale_decimal("123,456").unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ),
            PricePoint::on_date(
                parse_locale_decimal("124").unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ),
        ]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = render(&points(), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "date,close,currency\n2024-01-02,123.4560000,EUR\n2024-01-03,124.0000000,EUR\n"
        );
    }

    #[test]
    fn json_keeps_price_precision() {
        let json = render(&points(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["price"], "123.4560000");
        assert_eq!(parsed[1]["quote_currency"], "EUR");
        assert_eq!(parsed[0]["time"], "2024-01-02T00:00:00Z");
    }

    #[test]
    fn table_lists_one_line_per_point() {
        let table = render(&points(), OutputFormat::Table).unwrap();
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("2024-01-03"));
        assert!(table.contains("124.0000000"));
    }
}
