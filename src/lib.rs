//! minimal graphql client
//!
//! this crate sends graphql queries and mutations over http, optionally
//! caching whole responses under a caller-chosen key. start with [`Client`]
//! and [`ClientConfig`], then use `execute_raw` for data plus response
//! metadata or `execute` for typed data only. [`raw_request`] and
//! [`request`] cover one-off calls.
//!
//! ## quick start
//!
//! ```no_run
//! use graphql_fetch::{Client, ClientConfig, RequestOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("https://api.example.com/graphql"))?;
//! let response = client
//!     .execute_raw("{ viewer { login } }", None, &RequestOptions::default())
//!     .await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## caching
//!
//! attach a [`ResponseCache`] with [`Client::with_cache`] and pass
//! [`RequestOptions::cached`]. a miss goes to the transport and stores the
//! response with a `cache-control` directive carrying the ttl; a hit skips
//! the transport. expiry is left to the cache implementation.
//!
//! ## failures
//!
//! a call whose response is not a 2xx json body with `data` and without
//! `errors` fails with [`Error::GraphQl`], carrying a [`ClientError`] with
//! the full response and the request that produced it.

mod cache;
mod classify;
mod client;
mod config;
mod error;
mod graphql;
mod operation;
mod options;
mod response;
mod transport;

pub use cache::{MemoryCache, ResponseCache};
pub use classify::{classify, parse_body, Classification, FailureBody, ParsedBody};
pub use client::{raw_request, request, Client, RawResponse};
pub use config::ClientConfig;
pub use error::{ClientError, ClientErrorResponse, Error, RequestContext, Result};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlResponse, OperationEnvelope, Variables};
pub use operation::Operation;
pub use options::{CacheVisibility, RequestOptions};
pub use response::HttpResponse;
pub use transport::{
    CacheMode, Credentials, RedirectPolicy, ReferrerPolicy, RequestMode, ReqwestTransport,
    Transport, TransportRequest,
};

pub use reqwest::header;
pub use reqwest::{Method, StatusCode};
