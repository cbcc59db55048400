//! main client
//!
//! builds the request, goes through the response cache when asked to, calls
//! the transport and classifies what comes back.

use crate::cache::ResponseCache;
use crate::classify::{classify, parse_body, Classification};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientErrorResponse, Error, RequestContext, Result};
use crate::graphql::{OperationEnvelope, Variables};
use crate::operation::Operation;
use crate::options::RequestOptions;
use crate::response::HttpResponse;
use crate::transport::{ReqwestTransport, Transport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// successful graphql call
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// response data
    pub data: serde_json::Value,
    /// server extensions payload
    pub extensions: Option<serde_json::Value>,
    /// headers of the response the data came from
    pub headers: HeaderMap,
    /// http status of the response the data came from
    pub status: StatusCode,
}

/// graphql client
///
/// cloning is cheap; the configuration is shared until a clone changes its
/// headers. header setters take `&mut self`, so headers cannot change while a
/// call made through the same handle is in flight.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl Client {
    /// create a new client on the reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            cache: None,
        })
    }

    /// create a client on a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            cache: None,
        })
    }

    /// attach a response cache
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// replace all default headers
    pub fn set_headers(&mut self, headers: HeaderMap) -> &mut Self {
        Arc::make_mut(&mut self.config).replace_headers(headers);
        self
    }

    /// insert or replace one default header
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        Arc::make_mut(&mut self.config).upsert_header(name, value);
        self
    }

    /// execute a graphql operation and return data with response metadata
    #[tracing::instrument(skip_all, fields(cache_key = options.active_cache_key()))]
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Option<Variables>,
        options: &RequestOptions,
    ) -> Result<RawResponse> {
        options.validate()?;
        let url = self.config.url()?;
        let envelope = OperationEnvelope::new(query, variables);
        let body = envelope.to_body()?;

        let response = match (options.active_cache_key(), &self.cache) {
            (Some(key), Some(cache)) => {
                self.fetch_cached(cache.as_ref(), key, url, body, options)
                    .await?
            }
            _ => self.fetch(url, body, &options.headers).await?,
        };

        let parsed = parse_body(&response)?;
        match classify(&response, parsed) {
            Classification::Success { data, extensions } => {
                tracing::trace!(status = response.status().as_u16(), "graphql success");
                Ok(RawResponse {
                    data,
                    extensions,
                    status: response.status(),
                    headers: response.headers().clone(),
                })
            }
            Classification::Failure(body) => {
                tracing::trace!(status = response.status().as_u16(), "graphql failure");
                let OperationEnvelope { query, variables } = envelope;
                Err(ClientError::new(
                    ClientErrorResponse {
                        status: response.status(),
                        headers: response.headers().clone(),
                        body,
                    },
                    RequestContext { query, variables },
                )
                .into())
            }
        }
    }

    /// execute a graphql operation and deserialize its data
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Variables>,
        options: &RequestOptions,
    ) -> Result<T> {
        let response = self.execute_raw(query, variables, options).await?;
        Ok(serde_json::from_value(response.data)?)
    }

    /// execute a typed operation
    pub async fn execute_operation<O: Operation>(
        &self,
        variables: Option<&O::Variables>,
        options: &RequestOptions,
    ) -> Result<O::Response> {
        let variables = variables.map(operation_variables).transpose()?;
        self.execute(O::QUERY, variables, options).await
    }

    async fn fetch(&self, url: &Url, body: String, headers: &HeaderMap) -> Result<HttpResponse> {
        let request = self.config.transport_request(body, headers);
        tracing::debug!(%url, method = %request.method, "sending graphql request");
        let response = self.transport.fetch(url, request).await?;
        tracing::debug!(status = response.status().as_u16(), "received graphql response");
        Ok(response)
    }

    async fn fetch_cached(
        &self,
        cache: &dyn ResponseCache,
        key: &str,
        url: &Url,
        body: String,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        if let Some(hit) = cache.lookup(key).await? {
            tracing::debug!(cache_key = key, status = hit.status().as_u16(), "cache hit");
            return Ok(hit);
        }

        tracing::debug!(cache_key = key, "cache miss");
        let mut response = self.fetch(url, body, &options.headers).await?;
        apply_cache_directive(&mut response, options)?;
        cache.put(key, response.clone()).await?;
        tracing::debug!(cache_key = key, "stored response");
        Ok(response)
    }
}

/// stamp the ttl onto the snapshot
///
/// an existing cache-control header is replaced only with `cache_override`;
/// otherwise the directive is appended next to it.
fn apply_cache_directive(response: &mut HttpResponse, options: &RequestOptions) -> Result<()> {
    let value = HeaderValue::from_str(&options.cache_directive())
        .map_err(|err| Error::Config(format!("invalid cache-control value: {err}")))?;
    let headers = response.headers_mut();
    if headers.contains_key(CACHE_CONTROL) && options.cache_override {
        headers.insert(CACHE_CONTROL, value);
    } else {
        headers.append(CACHE_CONTROL, value);
    }
    Ok(())
}

fn operation_variables<V: Serialize>(variables: &V) -> Result<Variables> {
    match serde_json::to_value(variables)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::Config(format!(
            "operation variables must serialize to an object, got {other}"
        ))),
    }
}

/// one-off call through a throwaway client with default configuration
pub async fn raw_request(
    url: &str,
    query: &str,
    variables: Option<Variables>,
) -> Result<RawResponse> {
    Client::new(ClientConfig::new(url))?
        .execute_raw(query, variables, &RequestOptions::default())
        .await
}

/// one-off call returning only the deserialized data
pub async fn request<T: DeserializeOwned>(
    url: &str,
    query: &str,
    variables: Option<Variables>,
) -> Result<T> {
    Client::new(ClientConfig::new(url))?
        .execute(query, variables, &RequestOptions::default())
        .await
}
