use super::{SatClient, check_status, read_json};
use crate::error::{Error, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    token: Option<String>,
}

impl SatClient {
    /// Authenticate and return the bearer token
    ///
    /// Sends a multipart POST with the certificate (`cer`) and private key (`key`)
    /// as file parts and the key password as the `password` field. The key is
    /// uploaded as-is; no request signing is performed. Neither file is
    /// validated beyond being readable.
    ///
    /// # Errors
    /// * [`Error::Io`] - a credential file cannot be read
    /// * [`Error::Network`] - transport failure or the auth timeout elapsed
    /// * [`Error::Http`] - non-success status
    /// * [`Error::MalformedResponse`] - body is not JSON or has no `token`
    pub async fn authenticate(
        &self,
        certificate_path: &Path,
        private_key_path: &Path,
        password: &str,
    ) -> Result<String> {
        let form = Form::new()
            .part("cer", file_part(certificate_path).await?)
            .part("key", file_part(private_key_path).await?)
            .text("password", password.to_string());

        debug!(url = %self.endpoints.auth_url, "requesting authentication token");

        let response = self
            .http
            .post(&self.endpoints.auth_url)
            .multipart(form)
            .timeout(self.timeouts.auth)
            .send()
            .await?;
        let response = check_status(response)?;

        let body: AuthResponse = read_json(response, "auth").await?;
        match body.token {
            Some(token) if !token.is_empty() => {
                info!("authenticated against SAT service");
                Ok(token)
            }
            _ => Err(Error::MalformedResponse {
                endpoint: "auth",
                reason: "token not found in response".to_string(),
            }),
        }
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let content = tokio::fs::read(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read credential file '{}': {}", path.display(), e),
        ))
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "credential".to_string());

    Ok(Part::bytes(content).file_name(file_name))
}
