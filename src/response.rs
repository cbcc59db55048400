//! http response snapshot
//!
//! a fully buffered response that transports produce and caches store.

use crate::error::Result;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// buffered http response
///
/// headers keep every value per name, so appended directives survive a
/// round trip through a cache.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// create a response snapshot
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// buffer a reqwest response
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self::new(status, headers, body))
    }

    /// http status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// true for a 2xx status
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// mutable response headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// raw body bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// body decoded as utf-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// body parsed as json
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
