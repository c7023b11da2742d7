//! # zkhb-estate
//!
//! Client for the ZKHB estate billing web service.
//!
//! ## Features
//!
//! - **GetDataSet** - Run SQL through the service's SOAP `GetDataSet` operation
//! - **Actual charges** - Look up the charges paid for a room
//! - **DataSet parsing** - Turn `NewDataSet`/`Table` responses into ordered records
//!
//! ## Example
//!
//! ```rust,ignore
//! use zkhb_estate::{ActualChargeQuery, ZkhbClient};
//! use zkhb_client::RequestOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zkhb_estate::Error> {
//!     let client = ZkhbClient::new("http://billing.example.com/")?;
//!
//!     let query = ActualChargeQuery::new(12, "Property fee", "1-1-101", "2024-01-01 00:00:00");
//!     let records = client
//!         .query_actual_charge_list(&query, RequestOptions::new())
//!         .await?;
//!
//!     for record in &records {
//!         println!("{:?} {:?}", record.get_text("ChargeMListNo"), record.get_text("ActualAmount"));
//!     }
//!
//!     Ok(())
//! }
//! ```

mod charge;
mod client;
pub mod dataset;
mod error;
pub mod soap;
pub mod xml;

pub use charge::{ActualCharge, ActualChargeQuery, EstateId};
pub use client::ZkhbClient;
pub use dataset::{parse_data_set, Record};
pub use error::{Error, ErrorKind, Result};
pub use soap::{get_data_set_envelope, GET_DATA_SET_PATH};
pub use xml::{XmlMap, XmlValue};
