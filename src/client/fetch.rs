use super::{SatClient, check_status};
use crate::error::{Error, Result};
use crate::types::PackageId;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Write buffer size used while streaming a package to disk
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;

impl SatClient {
    /// Stream package `package_id` to `<output_dir>/<package_id>.zip`
    ///
    /// The file is created or overwritten and fully flushed before this returns.
    /// `output_dir` must already exist. The download timeout covers the whole
    /// transfer, body included.
    pub async fn fetch_package(
        &self,
        token: &str,
        package_id: &PackageId,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        if !package_id.is_path_safe() {
            return Err(Error::MalformedResponse {
                endpoint: "query",
                reason: format!(
                    "package identifier '{}' cannot be used as a file name",
                    package_id
                ),
            });
        }

        let url = self.package_url(package_id)?;
        debug!(%url, %package_id, "downloading package");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .timeout(self.timeouts.download)
            .send()
            .await?;
        let mut response = check_status(response)?;

        let zip_path = output_dir.join(package_id.archive_file_name());
        let file = tokio::fs::File::create(&zip_path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create '{}': {}", zip_path.display(), e),
            ))
        })?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);

        let mut bytes_written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            writer.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        writer.flush().await?;

        info!(%package_id, bytes = bytes_written, path = ?zip_path, "package downloaded");
        Ok(zip_path)
    }

    /// `<download_url>/<package_id>`, with the identifier percent-encoded as one segment
    pub(super) fn package_url(&self, package_id: &PackageId) -> Result<url::Url> {
        let key = "endpoints.download_url";
        let mut url = url::Url::parse(&self.endpoints.download_url)
            .map_err(|e| Error::config(key, format!("invalid URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::config(key, "URL cannot have path segments"))?
            .pop_if_empty()
            .push(package_id.as_str());
        Ok(url)
    }
}
