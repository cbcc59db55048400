//! client configuration
//!
//! build a [`ClientConfig`] with the endpoint url and optional request
//! defaults, then pass it to [`crate::Client::new`].

use crate::error::{Error, Result};
use crate::transport::{
    CacheMode, Credentials, RedirectPolicy, ReferrerPolicy, RequestMode, TransportRequest,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::time::Duration;
use url::Url;

/// configuration for the graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_url: String,

    /// graphql endpoint, or why the input did not parse
    pub(crate) url: std::result::Result<Url, url::ParseError>,

    /// method override (default: POST)
    pub(crate) method: Option<Method>,

    /// headers sent with every request
    pub(crate) headers: HeaderMap,

    pub(crate) mode: Option<RequestMode>,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) cache_mode: Option<CacheMode>,
    pub(crate) redirect: Option<RedirectPolicy>,
    pub(crate) referrer: Option<String>,
    pub(crate) referrer_policy: Option<ReferrerPolicy>,

    /// subresource integrity metadata
    pub(crate) integrity: Option<String>,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// prebuilt http client for the default transport
    pub(crate) http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// create a configuration for a graphql endpoint
    ///
    /// a bare host such as `api.example.com/graphql` is treated as https.
    ///
    /// # example
    ///
    /// ```
    /// use graphql_fetch::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(url: impl AsRef<str>) -> Self {
        let raw = url.as_ref();
        let url = match Url::parse(raw) {
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{raw}")),
            parsed => parsed,
        };

        Self {
            raw_url: raw.to_string(),
            url,
            method: None,
            headers: HeaderMap::new(),
            mode: None,
            credentials: None,
            cache_mode: None,
            redirect: None,
            referrer: None,
            referrer_policy: None,
            integrity: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("graphql-fetch/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            http_client: None,
        }
    }

    /// override the request method
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// set the request mode (logged only by the reqwest transport)
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// set the credentials mode
    ///
    /// explicit `authorization` or `cookie` headers are sent under every mode.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// set the http cache mode; `NoStore`, `Reload` and `NoCache` add
    /// request cache headers
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = Some(cache_mode);
        self
    }

    /// set the redirect policy
    ///
    /// default: follow
    pub fn with_redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// set the referrer url sent as `referer`
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    /// set the referrer policy
    ///
    /// default: strict-origin-when-cross-origin
    pub fn with_referrer_policy(mut self, policy: ReferrerPolicy) -> Self {
        self.referrer_policy = Some(policy);
        self
    }

    /// set the subresource integrity value (logged only by the reqwest transport)
    pub fn with_integrity(mut self, integrity: impl Into<String>) -> Self {
        self.integrity = Some(integrity.into());
        self
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// inject a prebuilt http client for the default transport.
    ///
    /// timeout, user agent, ssl verification and redirect policy then come
    /// from the prebuilt client.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// graphql endpoint
    ///
    /// fails with [`Error::Url`] when the endpoint given to [`ClientConfig::new`]
    /// did not parse.
    pub fn url(&self) -> Result<&Url> {
        self.url.as_ref().map_err(|err| Error::Url(*err))
    }

    /// default headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn replace_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    pub(crate) fn upsert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        let url = self.url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// assemble the transport request for a serialized body
    ///
    /// headers layer as json content type, then client defaults, then
    /// `per_call`; each layer replaces earlier values for the same name.
    pub(crate) fn transport_request(&self, body: String, per_call: &HeaderMap) -> TransportRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        overlay(&mut headers, &self.headers);
        overlay(&mut headers, per_call);

        TransportRequest {
            method: self.method.clone().unwrap_or(Method::POST),
            headers,
            body,
            mode: self.mode,
            credentials: self.credentials,
            cache_mode: self.cache_mode,
            redirect: self.redirect,
            referrer: self.referrer.clone(),
            referrer_policy: self.referrer_policy,
            integrity: self.integrity.clone(),
        }
    }
}

fn overlay(target: &mut HeaderMap, layer: &HeaderMap) {
    for name in layer.keys() {
        target.remove(name);
        for value in layer.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.raw_url)
            .field("method", &self.method)
            .field("headers", &self.headers.len())
            .field("mode", &self.mode)
            .field("credentials", &self.credentials)
            .field("cache_mode", &self.cache_mode)
            .field("redirect", &self.redirect)
            .field("referrer_policy", &self.referrer_policy)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}
