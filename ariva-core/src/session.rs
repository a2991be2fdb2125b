//! Login handshake and the cached authenticated session.
//!
//! ariva.de keeps its CSV export behind a Keycloak login. Logging in sets two
//! cookies on the client's cookie store; after that every request made through
//! the same client is authenticated. The session is created once per
//! [`SessionManager`] and never refreshed.

use crate::config::SourceConfig;
use crate::credentials::CredentialSource;
use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::PriceError;
use log::{debug, info, warn};
use scraper::{Html, Selector};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub const REFRESH_TOKEN_COOKIE: &str = "kc_refresh_token";
pub const ACCESS_TOKEN_COOKIE: &str = "kc_access_token";

/// An HTTP client whose cookie store holds a successful login.
pub struct Session {
    client: Arc<dyn HttpClient>,
    refresh_token: String,
    access_token: String,
}

impl Session {
    pub fn client(&self) -> &dyn HttpClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("refresh_token", &redact(&self.refresh_token))
            .field("access_token", &redact(&self.access_token))
            .finish_non_exhaustive()
    }
}

fn redact(token: &str) -> &'static str {
    if token.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// Creates the session on first use and hands out the cached one afterwards.
pub struct SessionManager {
    client: Arc<dyn HttpClient>,
    credentials: Box<dyn CredentialSource>,
    login_url: String,
    base_url: String,
    session: Mutex<Option<Arc<Session>>>,
}

impl SessionManager {
    pub fn new(
        client: Arc<dyn HttpClient>,
        credentials: Box<dyn CredentialSource>,
        config: &SourceConfig,
    ) -> Self {
        Self {
            client,
            credentials,
            login_url: config.login_url(),
            base_url: config.base_url.clone(),
            session: Mutex::new(None),
        }
    }

    /// Return the cached session, logging in first if there is none.
    ///
    /// The lock is held for the whole login so concurrent first callers wait for
    /// a single handshake instead of racing their own. A failed login leaves the
    /// cache empty.
    pub fn get_session(&self) -> Result<Arc<Session>, PriceError> {
        let mut cached = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = cached.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(self.login()?);
        *cached = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Whether a login has already succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn login(&self) -> Result<Session, PriceError> {
        debug!("fetching login page {}", self.login_url);
        let page = self
            .client
            .execute(HttpRequest::get(&self.login_url))
            .map_err(|e| {
                PriceError::Auth(format!("login page request failed: {}", e.message()))
            })?;

        let action = login_form_action(&page.body)?;
        let action_url = resolve_action(&page.url, &action)?;
        let credentials = self.credentials.credentials()?;

        debug!("submitting login form to {action_url}");
        let response = self
            .client
            .execute(
                HttpRequest::post(&action_url)
                    .with_header("Referer", &page.url)
                    .with_form(vec![
                        ("username".into(), credentials.username),
                        ("password".into(), credentials.password),
                    ]),
            )
            .map_err(|e| {
                PriceError::Auth(format!("login request failed: {}", e.message()))
            })?;

        let refresh_token = self.token_cookie(REFRESH_TOKEN_COOKIE, &action_url);
        let access_token = self.token_cookie(ACCESS_TOKEN_COOKIE, &action_url);

        match (response.is_success(), refresh_token, access_token) {
            (true, Some(refresh_token), Some(access_token)) => {
                info!("authenticated against {}", self.base_url);
                Ok(Session {
                    client: Arc::clone(&self.client),
                    refresh_token,
                    access_token,
                })
            }
            (success, refresh_token, access_token) => {
                warn!(
                    "login rejected: status {}, refresh token present: {}, access token present: {}",
                    response.status,
                    refresh_token.is_some(),
                    access_token.is_some()
                );
                let reason = if success {
                    "session cookies missing after login".to_string()
                } else {
                    format!("login returned status {}", response.status)
                };
                Err(PriceError::Auth(format!("failed to authenticate with ariva: {reason}")))
            }
        }
    }

    /// Look the cookie up for the site first, then for the login endpoint's host.
    fn token_cookie(&self, name: &str, action_url: &str) -> Option<String> {
        self.client
            .cookie(&self.base_url, name)
            .or_else(|| self.client.cookie(action_url, name))
            .filter(|value| !value.is_empty())
    }
}

/// `action` attribute of the first `<form>` on the login page.
pub fn login_form_action(html: &str) -> Result<String, PriceError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("form")
        .map_err(|e| PriceError::Auth(format!("form selector: {e:?}")))?;

    let form = document
        .select(&selector)
        .next()
        .ok_or_else(|| PriceError::Auth("login page has no form".into()))?;

    form.value()
        .attr("action")
        .map(str::to_string)
        .ok_or_else(|| PriceError::Auth("login form has no action".into()))
}

/// Resolve a form action against the URL the login page was served from.
fn resolve_action(page_url: &str, action: &str) -> Result<String, PriceError> {
    reqwest::Url::parse(page_url)
        .and_then(|base| base.join(action))
        .map(String::from)
        .map_err(|e| PriceError::Auth(format!("invalid login form action {action:?}: {e}")))
}
