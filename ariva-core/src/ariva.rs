//! ariva.de price source.
//!
//! Composes ticker parsing, the cached login session and the export fetcher into
//! the three [`PriceSource`] lookups. Errors from any stage are returned as-is.

use crate::config::SourceConfig;
use crate::credentials::{CredentialSource, EnvCredentials};
use crate::domain::DateRange;
use crate::export::PriceSeriesFetcher;
use crate::http_client::{HttpClient, HttpError, ReqwestHttpClient};
use crate::provider::{PriceError, PricePoint, PriceSource};
use crate::session::SessionManager;
use crate::ticker::TickerKey;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct ArivaSource {
    sessions: SessionManager,
    fetcher: PriceSeriesFetcher,
}

impl ArivaSource {
    /// Production source: reqwest transport, credentials from the environment.
    pub fn new(config: &SourceConfig) -> Result<Self, HttpError> {
        let client = Arc::new(ReqwestHttpClient::new(config)?);
        Ok(Self::with_parts(
            client,
            Box::new(EnvCredentials::from_config(config)),
            config,
        ))
    }

    /// Source over an arbitrary transport and credential source.
    pub fn with_parts(
        client: Arc<dyn HttpClient>,
        credentials: Box<dyn CredentialSource>,
        config: &SourceConfig,
    ) -> Self {
        Self {
            sessions: SessionManager::new(client, credentials, config),
            fetcher: PriceSeriesFetcher::new(config),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    fn fetch(&self, ticker: &str, range: DateRange) -> Result<Vec<PricePoint>, PriceError> {
        let key = TickerKey::parse(ticker)?;
        let session = self.sessions.get_session()?;
        self.fetcher.fetch(&session, &key, range)
    }
}

impl PriceSource for ArivaSource {
    fn name(&self) -> &str {
        "ariva"
    }

    fn get_latest_price(&self, ticker: &str) -> Result<Option<PricePoint>, PriceError> {
        Ok(self.fetch(ticker, DateRange::UNBOUNDED)?.pop())
    }

    fn get_historical_price(
        &self,
        ticker: &str,
        time: DateTime<Utc>,
    ) -> Result<Option<PricePoint>, PriceError> {
        let points = self.fetch(ticker, DateRange::single_day(time.date_naive()))?;
        Ok(points.into_iter().next())
    }

    fn get_prices_series(
        &self,
        ticker: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Vec<PricePoint>>, PriceError> {
        let range = DateRange::between(begin.date_naive(), end.date_naive());
        let points = self.fetch(ticker, range)?;
        Ok(if points.is_empty() { None } else { Some(points) })
    }
}
