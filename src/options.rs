//! per-call request options
//!
//! cache flags and header overrides for a single `execute` call.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;

/// visibility written into the injected cache-control directive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheVisibility {
    #[default]
    Public,
    Private,
}

impl CacheVisibility {
    /// directive token
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheVisibility::Public => "public",
            CacheVisibility::Private => "private",
        }
    }
}

impl fmt::Display for CacheVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// options for one call
///
/// `cache_key` and `cache_ttl` are required together whenever `use_cache`
/// is set. an empty key or a zero ttl counts as unset.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// consult and fill the response cache
    pub use_cache: bool,
    /// cache entry key
    pub cache_key: Option<String>,
    /// max-age in seconds for the stored snapshot
    pub cache_ttl: Option<u64>,
    /// visibility of the injected directive
    pub cache_visibility: CacheVisibility,
    /// replace an existing cache-control header instead of appending
    pub cache_override: bool,
    /// headers for this call only; they win over client defaults
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// options with caching disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// enable caching under `key` for `ttl_secs`
    pub fn cached(key: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            use_cache: true,
            cache_key: Some(key.into()),
            cache_ttl: Some(ttl_secs),
            ..Self::default()
        }
    }

    /// set the directive visibility
    pub fn with_cache_visibility(mut self, visibility: CacheVisibility) -> Self {
        self.cache_visibility = visibility;
        self
    }

    /// replace an upstream cache-control header rather than append
    pub fn with_cache_override(mut self, cache_override: bool) -> Self {
        self.cache_override = cache_override;
        self
    }

    /// add a header for this call
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// the cache-control value injected into stored snapshots
    pub(crate) fn cache_directive(&self) -> String {
        format!(
            "{}, max-age={}",
            self.cache_visibility,
            self.cache_ttl.unwrap_or(0)
        )
    }

    /// key to use for the cache path, if caching applies
    pub(crate) fn active_cache_key(&self) -> Option<&str> {
        if self.use_cache {
            self.cache_key.as_deref().filter(|key| !key.is_empty())
        } else {
            None
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.use_cache {
            return Ok(());
        }

        if self.cache_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Config(
                "cache is enabled but no cache key is set".to_string(),
            ));
        }

        if self.cache_ttl.is_none_or(|ttl| ttl == 0) {
            return Err(Error::Config(
                "cache is enabled but no cache ttl is set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_disables_cache() {
        let options = RequestOptions::new();
        assert!(!options.use_cache);
        assert!(options.validate().is_ok());
        assert!(options.active_cache_key().is_none());
    }

    #[test]
    fn test_cached_sets_key_and_ttl() {
        let options = RequestOptions::cached("users", 60);
        assert!(options.validate().is_ok());
        assert_eq!(options.active_cache_key(), Some("users"));
        assert_eq!(options.cache_directive(), "public, max-age=60");
    }

    #[test]
    fn test_missing_key_or_ttl() {
        let missing_key = RequestOptions {
            use_cache: true,
            cache_ttl: Some(60),
            ..RequestOptions::default()
        };
        assert!(matches!(missing_key.validate(), Err(Error::Config(_))));

        let missing_ttl = RequestOptions {
            use_cache: true,
            cache_key: Some("k".to_string()),
            ..RequestOptions::default()
        };
        assert!(matches!(missing_ttl.validate(), Err(Error::Config(_))));

        assert!(matches!(
            RequestOptions::cached("", 60).validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RequestOptions::cached("k", 0).validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_key_without_use_cache_is_ignored() {
        let options = RequestOptions {
            cache_key: Some("k".to_string()),
            ..RequestOptions::default()
        };
        assert!(options.validate().is_ok());
        assert!(options.active_cache_key().is_none());
    }

    #[test]
    fn test_private_directive() {
        let options = RequestOptions::cached("k", 5)
            .with_cache_visibility(CacheVisibility::Private)
            .with_cache_override(true);
        assert!(options.cache_override);
        assert_eq!(options.cache_directive(), "private, max-age=5");
    }
}
