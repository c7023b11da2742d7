//! # zkhb-api
//!
//! Client library for the ZKHB property-management billing service.
//!
//! ## Crates
//!
//! - **zkhb-client** - HTTP transport: base URL, request options, raw responses
//! - **zkhb-estate** - The billing service: GetDataSet SOAP calls, actual charge queries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zkhb_api::{ActualChargeQuery, RequestOptions, ZkhbClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ZkhbClient::new("http://billing.example.com")?;
//!
//!     let query = ActualChargeQuery::new(12, "Property fee", "1-1-101", "2024-01-01 00:00:00");
//!     let charges = client.query_actual_charges(&query, RequestOptions::new()).await?;
//!
//!     for charge in charges {
//!         println!("{:?} {:?}", charge.charge_m_list_no, charge.actual_amount);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "client")]
pub use zkhb_client as client;
#[cfg(feature = "estate")]
pub use zkhb_estate as estate;

// Re-export commonly used types at the top level
#[cfg(feature = "client")]
pub use zkhb_client::{ClientConfig, RawResponse, RequestMethod, RequestOptions, ZkhbHttpClient};
#[cfg(feature = "estate")]
pub use zkhb_estate::{ActualCharge, ActualChargeQuery, EstateId, Record, ZkhbClient};
