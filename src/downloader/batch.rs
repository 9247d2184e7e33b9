use super::{ProgressObserver, SatDownloader};
use crate::error::{Error, Result};
use crate::extraction;
use crate::types::{BatchSummary, DownloadRequest, Event, PackageId, PackageOutcome};
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{error, info, warn};

impl SatDownloader {
    /// Download and extract every package available for the request
    ///
    /// Steps, strictly in sequence:
    /// 1. Authenticate once. Failure aborts the batch and is returned unchanged.
    /// 2. Discover packages once. Failure aborts the batch and is returned unchanged.
    ///    `on_batch_start(total, 0)` is then called, even when `total == 0`.
    /// 3. For each package in discovery order: fetch it, extract it, and call
    ///    `on_progress(index, total)` on success (`index` is 1-based). A failed
    ///    package is logged, recorded in the summary and skipped without retry.
    ///    The configured package delay is observed after every package,
    ///    including the last.
    ///
    /// Returns `Ok` once every package has been attempted, however many failed;
    /// the [`BatchSummary`] tells them apart.
    pub async fn download_invoices<P>(
        &self,
        request: &DownloadRequest,
        progress: &mut P,
    ) -> Result<BatchSummary>
    where
        P: ProgressObserver + ?Sized,
    {
        let credentials = &request.credentials;
        info!(
            rfc = %credentials.rfc,
            start = %request.range.start,
            end = %request.range.end,
            output_dir = ?request.output_dir,
            "starting invoice download"
        );

        let token = self
            .service
            .authenticate(
                &credentials.certificate_path,
                &credentials.private_key_path,
                &credentials.password,
            )
            .await
            .map_err(|e| self.abort("authentication", e))?;
        self.emit_event(Event::Authenticated);

        let packages = self
            .service
            .list_packages(&token, &credentials.rfc, &request.range)
            .await
            .map_err(|e| self.abort("package discovery", e))?;

        let total = packages.len();
        progress.on_batch_start(total, 0);
        self.emit_event(Event::BatchStarted { total });

        let mut summary = BatchSummary {
            total,
            outcomes: Vec::with_capacity(total),
        };

        for (position, package_id) in packages.into_iter().enumerate() {
            let index = position + 1;
            let outcome = self
                .process_package(&token, package_id, index, &request.output_dir)
                .await;

            match &outcome {
                PackageOutcome::Extracted {
                    package_id,
                    documents,
                    ..
                } => {
                    progress.on_progress(index, total);
                    self.emit_event(Event::PackageExtracted {
                        index,
                        total,
                        package_id: package_id.clone(),
                        documents: documents.len(),
                    });
                }
                PackageOutcome::Failed {
                    package_id, error, ..
                } => {
                    warn!(
                        %package_id,
                        index,
                        total,
                        error = %error,
                        "failed to download package, skipping"
                    );
                    self.emit_event(Event::PackageFailed {
                        index,
                        total,
                        package_id: package_id.clone(),
                        error: error.clone(),
                    });
                }
            }
            summary.outcomes.push(outcome);

            if !self.config.package_delay.is_zero() {
                tokio::time::sleep(self.config.package_delay).await;
            }
        }

        let (succeeded, failed) = (summary.succeeded(), summary.failed());
        info!(total, succeeded, failed, "invoice download finished");
        self.emit_event(Event::Finished {
            total,
            succeeded,
            failed,
        });

        Ok(summary)
    }

    /// Fetch then extract one package, folding any error into the outcome
    async fn process_package(
        &self,
        token: &str,
        package_id: PackageId,
        index: usize,
        output_dir: &Path,
    ) -> PackageOutcome {
        match self.fetch_and_extract(token, &package_id, output_dir).await {
            Ok((archive, documents)) => PackageOutcome::Extracted {
                package_id,
                index,
                archive,
                documents,
            },
            Err(e) => PackageOutcome::Failed {
                package_id,
                index,
                error: e.to_string(),
            },
        }
    }

    async fn fetch_and_extract(
        &self,
        token: &str,
        package_id: &PackageId,
        output_dir: &Path,
    ) -> Result<(PathBuf, Vec<PathBuf>)> {
        let archive = self
            .service
            .fetch_package(token, package_id, output_dir)
            .await?;

        // Extraction is synchronous file I/O
        let archive_owned = archive.clone();
        let dest_owned = output_dir.to_path_buf();
        let extensions = self.config.extract_extensions.clone();
        let documents = spawn_blocking(move || {
            extraction::extract_all(&archive_owned, &dest_owned, &extensions)
        })
        .await
        .map_err(|e| Error::InvalidArchive {
            archive: archive.clone(),
            reason: format!("extraction task panicked: {}", e),
        })??;

        Ok((archive, documents))
    }

    /// Log and broadcast a fatal error, then hand it back for propagation
    fn abort(&self, stage: &'static str, e: Error) -> Error {
        error!(stage, error = %e, "invoice download aborted");
        self.emit_event(Event::Aborted {
            error: e.to_string(),
        });
        e
    }
}
