use super::http_request::request_common::HTTPRequestMethod;

/// A simple wrapper around `reqwest::Client` used to manage HTTP requests
/// with a preconfigured base URL and default settings.
///
/// One instance exists per remote service the boat talks to: the rudder
/// backend (authenticated with a bearer token) and the external wind and
/// shoreline data providers (token passed per request). It sets a fixed
/// timeout and allows easy reuse of the HTTP client infrastructure.
#[derive(Debug)]
pub struct HTTPClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL for the service, prepended to all endpoint paths.
    base_url: String,
    /// Optional bearer token sent in the `Authorization` header.
    bearer_token: Option<String>,
}

impl HTTPClient {
    /// Constructs a new `HTTPClient` with the given base URL.
    ///
    /// This client has a default request timeout of 5 seconds.
    pub fn new(base_url: &str) -> HTTPClient {
        HTTPClient {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .unwrap(),
            base_url: String::from(base_url),
            bearer_token: None,
        }
    }

    /// Constructs a client that authenticates every request with a bearer token.
    pub fn with_bearer(base_url: &str, token: &str) -> HTTPClient {
        let mut client = Self::new(base_url);
        client.bearer_token = Some(String::from(token));
        client
    }

    /// Builds a request against `endpoint`, applying the bearer token if one
    /// is configured.
    pub(super) fn request_builder(
        &self,
        method: HTTPRequestMethod,
        endpoint: &str,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let builder = match method {
            HTTPRequestMethod::Get => self.client.get(url),
            HTTPRequestMethod::Post => self.client.post(url),
            HTTPRequestMethod::Put => self.client.put(url),
            HTTPRequestMethod::Delete => self.client.delete(url),
        };
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Returns the base URL that the client was initialized with.
    pub fn url(&self) -> &str { self.base_url.as_str() }
}
