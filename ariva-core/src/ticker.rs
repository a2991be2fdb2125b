//! Ticker parsing: `SYMBOL_ID:MARKET_ID`.

use crate::provider::PriceError;
use std::fmt;

/// Provider instrument id paired with the venue quoting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickerKey {
    pub symbol_id: String,
    pub market_id: String,
}

impl TickerKey {
    /// Split a ticker on its single colon. No trimming or normalization is applied.
    pub fn parse(ticker: &str) -> Result<Self, PriceError> {
        if ticker.matches(':').count() != 1 {
            return Err(PriceError::Format(format!(
                "ticker must be in the format \"SYMBOL_ID:MARKET_ID\", got {ticker:?}"
            )));
        }
        let (symbol_id, market_id) = ticker
            .split_once(':')
            .ok_or_else(|| PriceError::Format(format!("missing separator in {ticker:?}")))?;
        Ok(Self {
            symbol_id: symbol_id.to_string(),
            market_id: market_id.to_string(),
        })
    }
}

impl fmt::Display for TickerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol_id, self.market_id)
    }
}
