//! Scripted in-memory transport for driving the source without a network.

#![allow(dead_code)]

use ariva_core::{
    ArivaSource, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, SourceConfig,
    StaticCredentials,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://ariva.test";
pub const LOGIN_URL: &str = "https://ariva.test/user/login/";
pub const AUTH_URL: &str = "https://ariva.test/realms/ariva/authenticate";
pub const EXPORT_URL: &str = "https://ariva.test/quote/historic/historic.csv";

pub const LOGIN_PAGE: &str = r#"<html><body>
<form id="kc-form-login" method="post" action="/realms/ariva/authenticate">
  <input name="username"><input name="password" type="password">
</form>
</body></html>"#;

pub const TOKEN_COOKIES: &[(&str, &str)] = &[
    ("kc_refresh_token", "refresh-1"),
    ("kc_access_token", "access-1"),
];

struct Route {
    method: HttpMethod,
    url: String,
    response: Result<HttpResponse, HttpError>,
    set_cookies: Vec<(String, String)>,
}

/// Answers requests from a fixed route table and records everything it sees.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Vec<Route>,
    requests: Mutex<Vec<HttpRequest>>,
    cookies: Mutex<HashMap<String, String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(self, url: &str, response: HttpResponse) -> Self {
        self.route(HttpMethod::Get, url, Ok(response), &[])
    }

    pub fn on_get_error(self, url: &str, message: &str) -> Self {
        self.route(HttpMethod::Get, url, Err(HttpError::new(message)), &[])
    }

    pub fn on_post(self, url: &str, response: HttpResponse, cookies: &[(&str, &str)]) -> Self {
        self.route(HttpMethod::Post, url, Ok(response), cookies)
    }

    fn route(
        mut self,
        method: HttpMethod,
        url: &str,
        response: Result<HttpResponse, HttpError>,
        cookies: &[(&str, &str)],
    ) -> Self {
        self.routes.push(Route {
            method,
            url: url.to_string(),
            response,
            set_cookies: cookies
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn export_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url == EXPORT_URL)
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());

        let route = self
            .routes
            .iter()
            .find(|r| r.method == request.method && r.url == request.url)
            .ok_or_else(|| HttpError::new(format!("no route for {}", request.url)))?;

        let mut cookies = self.cookies.lock().unwrap();
        for (name, value) in &route.set_cookies {
            cookies.insert(name.clone(), value.clone());
        }
        route.response.clone()
    }

    fn cookie(&self, _url: &str, name: &str) -> Option<String> {
        self.cookies.lock().unwrap().get(name).cloned()
    }
}

pub fn test_config() -> SourceConfig {
    SourceConfig {
        base_url: BASE_URL.into(),
        ..SourceConfig::default()
    }
}

pub fn csv_response(body: &str) -> HttpResponse {
    HttpResponse::new(200, EXPORT_URL, body).with_content_type("text/csv")
}

/// Transport with a working login and the given export response.
pub fn provider_with_export(export: HttpResponse) -> ScriptedHttpClient {
    ScriptedHttpClient::new()
        .on_get(LOGIN_URL, HttpResponse::new(200, LOGIN_URL, LOGIN_PAGE))
        .on_post(AUTH_URL, HttpResponse::new(200, BASE_URL, "ok"), TOKEN_COOKIES)
        .on_get(EXPORT_URL, export)
}

pub fn source_over(client: Arc<ScriptedHttpClient>) -> ArivaSource {
    ArivaSource::with_parts(
        client,
        Box::new(StaticCredentials::new("alice", "secret")),
        &test_config(),
    )
}
