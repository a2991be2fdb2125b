//! ariva core: authenticated closing-price lookups against ariva.de.
//!
//! - Login handshake with a cached, cookie-backed session
//! - Historical CSV export requests with server- and client-side date filtering
//! - German decimal parsing into fixed seven-digit prices
//! - A `PriceSource` façade: latest, historical and series lookups by
//!   `SYMBOL_ID:MARKET_ID` ticker

pub mod ariva;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod export;
pub mod http_client;
pub mod provider;
pub mod session;
pub mod ticker;

pub use ariva::ArivaSource;
pub use config::{ConfigError, SourceConfig};
pub use credentials::{CredentialSource, Credentials, EnvCredentials, StaticCredentials};
pub use domain::DateRange;
pub use export::PriceSeriesFetcher;
pub use http_client::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::{PriceError, PricePoint, PriceSource, PRICE_SCALE, QUOTE_CURRENCY};
pub use session::{Session, SessionManager};
pub use ticker::TickerKey;
