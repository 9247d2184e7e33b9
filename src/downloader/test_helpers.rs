//! Shared test helpers: a scripted in-memory SAT service and progress recorder.

use crate::client::SatService;
use crate::config::Config;
use crate::downloader::{ProgressObserver, SatDownloader};
use crate::error::{Error, Result};
use crate::types::{Credentials, DateRange, DownloadRequest, PackageId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake download endpoint does for one package
#[derive(Clone, Debug)]
pub(crate) enum FakePackage {
    /// Serve a zip archive built from these entries
    Zip(Vec<(String, Vec<u8>)>),
    /// Serve bytes that are not a zip archive
    Corrupt,
    /// Answer with this HTTP status
    Status(u16),
}

/// A service call observed by [`FakeService`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Authenticate,
    ListPackages { token: String, rfc: String },
    FetchPackage { token: String, package_id: String },
}

/// Scripted [`SatService`] recording every call it receives
pub(crate) struct FakeService {
    pub(crate) auth_status: Option<u16>,
    pub(crate) query_status: Option<u16>,
    pub(crate) packages: Vec<PackageId>,
    pub(crate) archives: HashMap<String, FakePackage>,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl FakeService {
    /// Service that authenticates and lists `packages`, each serving one xml document
    pub(crate) fn with_packages(ids: &[&str]) -> Self {
        let archives = ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    FakePackage::Zip(vec![(
                        format!("{}/invoice.xml", id),
                        format!("<cfdi id=\"{}\"/>", id).into_bytes(),
                    )]),
                )
            })
            .collect();

        Self {
            auth_status: None,
            query_status: None,
            packages: ids.iter().map(|id| PackageId::from(*id)).collect(),
            archives,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_package(&mut self, id: &str, package: FakePackage) {
        self.archives.insert(id.to_string(), package);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::FetchPackage { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn http_error(status: u16, endpoint: &str) -> Error {
    Error::Http {
        status,
        url: format!("http://fake.invalid/{}", endpoint),
    }
}

#[async_trait]
impl SatService for FakeService {
    async fn authenticate(
        &self,
        _certificate_path: &Path,
        _private_key_path: &Path,
        _password: &str,
    ) -> Result<String> {
        self.record(Call::Authenticate);
        match self.auth_status {
            Some(status) => Err(http_error(status, "auth")),
            None => Ok("fake-token".to_string()),
        }
    }

    async fn list_packages(
        &self,
        token: &str,
        rfc: &str,
        _range: &DateRange,
    ) -> Result<Vec<PackageId>> {
        self.record(Call::ListPackages {
            token: token.to_string(),
            rfc: rfc.to_string(),
        });
        match self.query_status {
            Some(status) => Err(http_error(status, "query")),
            None => Ok(self.packages.clone()),
        }
    }

    async fn fetch_package(
        &self,
        token: &str,
        package_id: &PackageId,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        self.record(Call::FetchPackage {
            token: token.to_string(),
            package_id: package_id.to_string(),
        });

        let zip_path = output_dir.join(package_id.archive_file_name());
        match self.archives.get(package_id.as_str()) {
            Some(FakePackage::Zip(entries)) => {
                write_zip(&zip_path, entries);
                Ok(zip_path)
            }
            Some(FakePackage::Corrupt) => {
                std::fs::write(&zip_path, b"definitely not a zip")?;
                Ok(zip_path)
            }
            Some(FakePackage::Status(status)) => Err(http_error(*status, "download")),
            None => Err(http_error(404, "download")),
        }
    }
}

/// Write a zip archive with the given entries
pub(crate) fn write_zip(path: &Path, entries: &[(String, Vec<u8>)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, content) in entries {
        writer.start_file(name.as_str(), options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap();
}

/// Progress observer remembering every callback in order
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    pub(crate) batch_starts: Vec<(usize, usize)>,
    pub(crate) progress: Vec<(usize, usize)>,
    /// Interleaved log: "start" or "progress"
    pub(crate) order: Vec<&'static str>,
}

impl ProgressObserver for RecordingProgress {
    fn on_batch_start(&mut self, total: usize, current: usize) {
        self.batch_starts.push((total, current));
        self.order.push("start");
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        self.progress.push((current, total));
        self.order.push("progress");
    }
}

/// Config with no inter-package delay so tests run quickly
pub(crate) fn test_config() -> Config {
    Config {
        package_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// Create a downloader around `service` plus a request writing into a fresh temp dir.
/// Returns the tempdir too (which must be kept alive).
pub(crate) fn create_test_downloader(
    service: Arc<FakeService>,
    config: Config,
) -> (SatDownloader, DownloadRequest, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let downloader = SatDownloader::with_service(config, service).unwrap();
    let request = DownloadRequest {
        credentials: Credentials::new(
            "AAA010101AAA",
            temp_dir.path().join("a.cer").to_string_lossy(),
            temp_dir.path().join("a.key").to_string_lossy(),
            "secret",
        ),
        range: DateRange::parse("2024-01-01", "2024-01-31").unwrap(),
        output_dir: temp_dir.path().to_path_buf(),
    };
    (downloader, request, temp_dir)
}
