//! HTTP client for the SAT mass-download service
//!
//! Three opaque endpoints are involved:
//! - [`auth`] - exchanges certificate, key and password for a bearer token
//! - [`query`] - lists the package identifiers available for a date range
//! - [`fetch`] - streams one package archive to disk
//!
//! No call is retried here. Failures propagate to the caller, which decides
//! whether they are fatal for the batch.

mod auth;
mod fetch;
mod query;


pub use fetch::DOWNLOAD_CHUNK_SIZE;

use crate::config::{Config, EndpointConfig, TimeoutConfig};
use crate::error::{Error, Result};
use crate::types::{DateRange, PackageId};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Abstraction over the remote service, enabling testability.
///
/// [`SatClient`] is the production implementation; tests drive the batch
/// orchestrator with scripted fakes.
#[async_trait]
pub trait SatService: Send + Sync {
    /// Exchange credential material for a bearer token
    async fn authenticate(
        &self,
        certificate_path: &Path,
        private_key_path: &Path,
        password: &str,
    ) -> Result<String>;

    /// List package identifiers for a taxpayer and date range, in service order
    async fn list_packages(
        &self,
        token: &str,
        rfc: &str,
        range: &DateRange,
    ) -> Result<Vec<PackageId>>;

    /// Download one package into `output_dir` and return the archive path
    async fn fetch_package(
        &self,
        token: &str,
        package_id: &PackageId,
        output_dir: &Path,
    ) -> Result<PathBuf>;
}

/// Production [`SatService`] backed by `reqwest`
#[derive(Clone, Debug)]
pub struct SatClient {
    http: reqwest::Client,
    endpoints: EndpointConfig,
    timeouts: TimeoutConfig,
}

impl SatClient {
    /// Build a client from the endpoint and timeout settings in `config`
    ///
    /// Timeouts are applied per request, so one client serves all three endpoints.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sat-dl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            timeouts: config.timeouts.clone(),
        })
    }
}

#[async_trait]
impl SatService for SatClient {
    async fn authenticate(
        &self,
        certificate_path: &Path,
        private_key_path: &Path,
        password: &str,
    ) -> Result<String> {
        SatClient::authenticate(self, certificate_path, private_key_path, password).await
    }

    async fn list_packages(
        &self,
        token: &str,
        rfc: &str,
        range: &DateRange,
    ) -> Result<Vec<PackageId>> {
        SatClient::list_packages(self, token, rfc, range).await
    }

    async fn fetch_package(
        &self,
        token: &str,
        package_id: &PackageId,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        SatClient::fetch_package(self, token, package_id, output_dir).await
    }
}

/// Turn any non-success status into [`Error::Http`]
fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

/// Read the whole body and decode it as JSON, reporting failures against `endpoint`
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &'static str,
) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| Error::MalformedResponse {
        endpoint,
        reason: format!("invalid JSON body: {}", e),
    })
}
