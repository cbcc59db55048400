//! transport
//!
//! the fetch-like collaborator that performs the http call, and the default
//! implementation on top of reqwest.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::response::HttpResponse;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA, REFERER};
use reqwest::Method;
use url::Url;

/// request mode, as in the fetch api
///
/// passed through to the transport; the reqwest transport only logs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// cross-origin requests allowed under cors
    Cors,
    /// cross-origin requests without cors
    NoCors,
    /// same-origin requests only
    SameOrigin,
    /// document navigation
    Navigate,
}

/// credentials mode
///
/// governs ambient credentials only. headers the caller set explicitly are
/// always sent; the reqwest transport keeps no cookie store, so no mode adds
/// or strips anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// never attach ambient credentials
    Omit,
    /// attach ambient credentials to same-origin requests
    SameOrigin,
    /// always attach ambient credentials
    Include,
}

/// http cache mode of the outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// leave request headers alone
    Default,
    /// send `cache-control: no-cache` and `pragma: no-cache`
    NoStore,
    /// same headers as `NoStore`
    Reload,
    /// send `cache-control: max-age=0`
    NoCache,
    /// no http cache to consult; sent as is
    ForceCache,
    /// no http cache to consult; sent as is
    OnlyIfCached,
}

/// redirect handling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// follow redirects (up to reqwest's default limit)
    #[default]
    Follow,
    /// fail the call with a transport error on any redirect
    Error,
    /// return the 3xx response as is
    Manual,
}

/// referrer policy, as in the fetch api
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferrerPolicy {
    /// never send a referrer
    NoReferrer,
    /// full url, except on an https to http downgrade
    NoReferrerWhenDowngrade,
    /// origin only
    Origin,
    /// full url same-origin, origin only cross-origin
    OriginWhenCrossOrigin,
    /// full url same-origin, nothing cross-origin
    SameOrigin,
    /// origin only, nothing on downgrade
    StrictOrigin,
    /// full url same-origin, origin cross-origin, nothing on downgrade
    #[default]
    StrictOriginWhenCrossOrigin,
    /// always the full url
    UnsafeUrl,
}

/// everything a transport needs for one call
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: String,
    pub mode: Option<RequestMode>,
    pub credentials: Option<Credentials>,
    pub cache_mode: Option<CacheMode>,
    pub redirect: Option<RedirectPolicy>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<ReferrerPolicy>,
    pub integrity: Option<String>,
}

/// performs one http exchange
///
/// failures are returned unchanged to the caller of `execute`; nothing here
/// is retried.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url, request: TransportRequest) -> Result<HttpResponse>;
}

/// transport backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// wrap an existing client
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// build the http client from client configuration
    ///
    /// a prebuilt client in the config is used as-is.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        if let Some(http) = &config.http_client {
            return Ok(Self::new(http.clone()));
        }

        let redirect = match config.redirect.unwrap_or_default() {
            RedirectPolicy::Follow => reqwest::redirect::Policy::default(),
            RedirectPolicy::Manual => reqwest::redirect::Policy::none(),
            RedirectPolicy::Error => reqwest::redirect::Policy::custom(|attempt| {
                attempt.error("redirect encountered with redirect policy error")
            }),
        };

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(redirect)
            .build()?;

        Ok(Self::new(http))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &Url, request: TransportRequest) -> Result<HttpResponse> {
        let TransportRequest {
            method,
            mut headers,
            body,
            mode,
            credentials,
            cache_mode,
            redirect: _,
            referrer,
            referrer_policy,
            integrity,
        } = request;

        if mode.is_some() || credentials.is_some() || integrity.is_some() {
            tracing::debug!(
                ?mode,
                ?credentials,
                has_integrity = integrity.is_some(),
                "request mode, credentials and integrity are not enforced by the reqwest transport"
            );
        }

        if let Some(cache_mode) = cache_mode {
            apply_cache_mode(&mut headers, cache_mode);
        }

        if let Some(referrer) = referrer.as_deref() {
            let policy = referrer_policy.unwrap_or_default();
            if let Some(value) = referrer_header(referrer, policy, url) {
                let value = HeaderValue::from_str(&value)
                    .map_err(|err| Error::Config(format!("invalid referrer: {err}")))?;
                headers.insert(REFERER, value);
            }
        }

        let response = self
            .http
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        HttpResponse::from_reqwest(response).await
    }
}

fn apply_cache_mode(headers: &mut HeaderMap, cache_mode: CacheMode) {
    let directive = match cache_mode {
        CacheMode::NoStore | CacheMode::Reload => "no-cache",
        CacheMode::NoCache => "max-age=0",
        _ => return,
    };
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(directive));
    }
    if directive == "no-cache" && !headers.contains_key(PRAGMA) {
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    }
}

/// compute the `referer` value sent to `target` under `policy`
pub(crate) fn referrer_header(
    referrer: &str,
    policy: ReferrerPolicy,
    target: &Url,
) -> Option<String> {
    let mut source = Url::parse(referrer).ok()?;
    if !matches!(source.scheme(), "http" | "https") {
        return None;
    }
    source.set_fragment(None);
    let _ = source.set_username("");
    let _ = source.set_password(None);

    let origin = source.origin();
    if !origin.is_tuple() {
        return None;
    }
    let origin_only = format!("{}/", origin.ascii_serialization());
    let full = source.to_string();
    let same_origin = origin == target.origin();
    let downgrade = source.scheme() == "https" && target.scheme() != "https";

    match policy {
        ReferrerPolicy::NoReferrer => None,
        ReferrerPolicy::UnsafeUrl => Some(full),
        ReferrerPolicy::Origin => Some(origin_only),
        ReferrerPolicy::StrictOrigin => (!downgrade).then_some(origin_only),
        ReferrerPolicy::NoReferrerWhenDowngrade => (!downgrade).then_some(full),
        ReferrerPolicy::SameOrigin => same_origin.then_some(full),
        ReferrerPolicy::OriginWhenCrossOrigin => {
            Some(if same_origin { full } else { origin_only })
        }
        ReferrerPolicy::StrictOriginWhenCrossOrigin => {
            if same_origin {
                Some(full)
            } else if downgrade {
                None
            } else {
                Some(origin_only)
            }
        }
    }
}
