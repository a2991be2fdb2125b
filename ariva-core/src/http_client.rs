//! Blocking HTTP transport seam.
//!
//! The session and the export fetcher only talk to [`HttpClient`], so tests can
//! script provider responses without a network. [`ReqwestHttpClient`] is the
//! production transport; its cookie jar is what makes a login stick.

use crate::config::SourceConfig;
use reqwest::cookie::{CookieStore, Jar};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Outgoing request. Query and form pairs are URL-encoded by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
        self.form = form;
        self
    }

    /// Value of a query parameter, if set.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response after redirects have been followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL, which differs from the request URL after a redirect.
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure: connect, timeout, TLS, unreadable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Blocking transport with a persistent cookie store.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;

    /// Value of the named cookie the store would send to `url`.
    fn cookie(&self, url: &str, name: &str) -> Option<String>;
}

/// Production transport on `reqwest::blocking` with a shared cookie jar.
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
    jar: Arc<Jar>,
}

impl ReqwestHttpClient {
    pub fn new(config: &SourceConfig) -> Result<Self, HttpError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::blocking::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| HttpError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, jar })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                HttpError::new(format!("request timeout: {e}"))
            } else if e.is_connect() {
                HttpError::new(format!("connection failed: {e}"))
            } else {
                HttpError::new(format!("request failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            url,
            content_type,
            body,
        })
    }

    fn cookie(&self, url: &str, name: &str) -> Option<String> {
        let url = reqwest::Url::parse(url).ok()?;
        let header = self.jar.cookies(&url)?;
        cookie_value(header.to_str().ok()?, name)
    }
}

/// Pick one cookie out of a `Cookie:` header value.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_lowercased() {
        let request = HttpRequest::get("https://example.test/").with_header("Referer", "x");
        assert_eq!(request.headers.get("referer").map(String::as_str), Some("x"));
    }

    #[test]
    fn query_param_lookup() {
        let request = HttpRequest::get("https://example.test/")
            .with_query(vec![("secu".into(), "42".into())]);
        assert_eq!(request.query_param("secu"), Some("42"));
        assert_eq!(request.query_param("boerse_id"), None);
    }

    #[test]
    fn error_message_matches_display() {
        let err = HttpError::new("connection failed: refused");
        assert_eq!(err.message(), "connection failed: refused");
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn success_is_2xx_only() {
        assert!(HttpResponse::new(200, "u", "").is_success());
        assert!(HttpResponse::new(204, "u", "").is_success());
        assert!(!HttpResponse::new(302, "u", "").is_success());
        assert!(!HttpResponse::new(500, "u", "").is_success());
    }

    #[test]
    fn cookie_value_picks_named_pair() {
        let header = "kc_refresh_token=r1; kc_access_token=a1; other=x";
        assert_eq!(cookie_value(header, "kc_access_token").as_deref(), Some("a1"));
        assert_eq!(cookie_value(header, "kc_refresh_token").as_deref(), Some("r1"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn jar_backed_client_reads_stored_cookies() {
        let client = ReqwestHttpClient::new(&SourceConfig::default()).unwrap();
        let url = reqwest::Url::parse("https://www.ariva.de/").unwrap();
        client.jar.add_cookie_str("kc_access_token=abc; Path=/", &url);

        assert_eq!(
            client.cookie("https://www.ariva.de/quote", "kc_access_token").as_deref(),
            Some("abc")
        );
    }
}
