//! ZKHB estate billing service client.

use tracing::{debug, instrument, warn};
use zkhb_client::{ClientConfig, RequestOptions, ZkhbHttpClient};

use crate::charge::{ActualCharge, ActualChargeQuery};
use crate::dataset::{parse_data_set, Record};
use crate::error::Result;
use crate::soap::{get_data_set_envelope, GET_DATA_SET_PATH};

/// Client for the estate billing web service.
///
/// Plain HTTP calls (`post`, `request`, `execute`) are available through
/// [`ZkhbClient::http`].
#[derive(Debug, Clone)]
pub struct ZkhbClient {
    http: ZkhbHttpClient,
}

impl ZkhbClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: ZkhbHttpClient::with_base_url(base_url)?,
        })
    }

    /// Create a client with a custom transport configuration.
    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: ZkhbHttpClient::new(base_url, config)?,
        })
    }

    /// Wrap an existing HTTP client.
    pub fn from_http_client(http: ZkhbHttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Set the base URL. A single trailing slash is stripped.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.http.set_base_url(base_url);
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &ZkhbHttpClient {
        &self.http
    }

    /// Run `sql` through `GetDataSet` at the default endpoint path.
    pub async fn get_data_set(&self, sql: &str, options: RequestOptions) -> Result<Option<String>> {
        self.get_data_set_at(GET_DATA_SET_PATH, sql, options).await
    }

    /// Run `sql` through `GetDataSet` at `url`.
    ///
    /// Returns the raw response text on HTTP 200 and `None` otherwise.
    /// `Content-Type` defaults to `text/xml; charset=utf-8` unless set in
    /// `options`.
    #[instrument(skip(self, sql, options))]
    pub async fn get_data_set_at(
        &self,
        url: &str,
        sql: &str,
        options: RequestOptions,
    ) -> Result<Option<String>> {
        let envelope = get_data_set_envelope(sql)?;

        let request = self.http.post(url).xml(envelope).options(options);
        Ok(self.http.execute(request).await?)
    }

    /// Look up the actual charges of a room.
    ///
    /// Arguments are validated before anything is sent; a bad argument is the
    /// only error this returns. A failed request, a non-200 status or a
    /// response without `NewDataSet` all give an empty list, so an empty
    /// result does not prove there are no charges.
    #[instrument(skip(self, query, options), fields(estate_id = %query.estate_id, room_no = %query.room_no))]
    pub async fn query_actual_charge_list(
        &self,
        query: &ActualChargeQuery,
        options: RequestOptions,
    ) -> Result<Vec<Record>> {
        query.validate()?;

        let text = match self.get_data_set(&query.to_sql(), options).await {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                warn!(error = %err, "GetDataSet failed, returning no charges");
                return Ok(Vec::new());
            }
        };

        let records = parse_data_set(&text);
        debug!(count = records.len(), "Actual charge records received");
        Ok(records)
    }

    /// [`ZkhbClient::query_actual_charge_list`] mapped to typed rows.
    pub async fn query_actual_charges(
        &self,
        query: &ActualChargeQuery,
        options: RequestOptions,
    ) -> Result<Vec<ActualCharge>> {
        let records = self.query_actual_charge_list(query, options).await?;
        Ok(records.iter().map(ActualCharge::from).collect())
    }
}
