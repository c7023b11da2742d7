//! # zkhb-client
//!
//! HTTP transport for the ZKHB property-management billing service.
//!
//! This crate provides the plumbing every ZKHB call goes through:
//! - A mutable base URL that relative request paths resolve against
//! - A request builder carrying query parameters, body and per-call options
//! - Typed per-call transport options (headers, timeout, proxy, TLS verify)
//! - "Text on 200, nothing otherwise" response handling, or a custom
//!   transform over the raw response
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Service Layer                            │
//! │  (zkhb-estate: GetDataSet, actual charge queries)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ZkhbHttpClient                           │
//! │  - Base URL + pooled reqwest client                         │
//! │  - execute (200 → text) / execute_with (raw → T)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use zkhb_client::{ZkhbHttpClient, RequestOptions};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zkhb_client::Error> {
//!     let client = ZkhbHttpClient::with_base_url("http://billing.example.com/")?;
//!
//!     let text = client
//!         .execute(
//!             client
//!                 .post("/estate/webService/ForcelandEstateService.asmx")
//!                 .query("op", "GetDataSet")
//!                 .options(RequestOptions::new().with_timeout(Duration::from_secs(5))),
//!         )
//!         .await?;
//!
//!     println!("{:?}", text);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::ZkhbHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod, RequestOptions};
pub use response::RawResponse;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("zkhb-api/", env!("CARGO_PKG_VERSION"));
