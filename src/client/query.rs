use super::{SatClient, check_status, read_json};
use crate::error::Result;
use crate::types::{DateRange, PackageId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    rfc: &'a str,
    #[serde(rename = "fechaInicial")]
    start: NaiveDate,
    #[serde(rename = "fechaFinal")]
    end: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    packages: Option<Vec<PackageId>>,
}

impl SatClient {
    /// Request the package identifiers available for `rfc` in `range`
    ///
    /// A single request is made; if the service paginates, only the first page
    /// is seen. A response without `packages` means no packages.
    pub async fn list_packages(
        &self,
        token: &str,
        rfc: &str,
        range: &DateRange,
    ) -> Result<Vec<PackageId>> {
        let payload = QueryRequest {
            rfc,
            start: range.start,
            end: range.end,
        };

        debug!(
            url = %self.endpoints.query_url,
            rfc,
            start = %range.start,
            end = %range.end,
            "querying available packages"
        );

        let response = self
            .http
            .post(&self.endpoints.query_url)
            .bearer_auth(token)
            .json(&payload)
            .timeout(self.timeouts.query)
            .send()
            .await?;
        let response = check_status(response)?;

        let body: QueryResponse = read_json(response, "query").await?;
        let packages = body.packages.unwrap_or_default();

        info!(rfc, count = packages.len(), "packages available");
        Ok(packages)
    }
}
