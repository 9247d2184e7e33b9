//! Mock SAT service built on wiremock

use sat_dl::{Config, Credentials, DateRange, DownloadRequest};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token handed out by [`MockSat::mount_auth_ok`]
pub const TOKEN: &str = "integration-token";

/// Taxpayer identifier used by [`MockSat::request`]
pub const RFC: &str = "XAXX010101000";

/// A mock service plus a scratch directory holding credentials and output
pub struct MockSat {
    pub server: MockServer,
    pub temp_dir: TempDir,
}

impl MockSat {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Config pointing every endpoint at the mock server, without package delay
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.endpoints.auth_url = format!("{}/auth", self.server.uri());
        config.endpoints.query_url = format!("{}/query", self.server.uri());
        config.endpoints.download_url = format!("{}/download", self.server.uri());
        config.package_delay = Duration::ZERO;
        config.output_dir = self.output_dir();
        config
    }

    pub fn output_dir(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    /// Request with real credential files on disk and an existing output directory
    pub fn request(&self) -> DownloadRequest {
        let cer = self.temp_dir.path().join("fiel.cer");
        let key = self.temp_dir.path().join("fiel.key");
        std::fs::write(&cer, b"cer-bytes").unwrap();
        std::fs::write(&key, b"key-bytes").unwrap();
        std::fs::create_dir_all(self.output_dir()).unwrap();

        DownloadRequest {
            credentials: Credentials::new(
                RFC,
                cer.to_string_lossy(),
                key.to_string_lossy(),
                "12345678a",
            ),
            range: DateRange::parse("2024-03-01", "2024-03-31").unwrap(),
            output_dir: self.output_dir(),
        }
    }

    pub async fn mount_auth_ok(&self) {
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": TOKEN })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_auth_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_query(&self, packages: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "packages": packages })),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_package(&self, id: &str, archive: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/download/{}", id)))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_package_status(&self, id: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/download/{}", id)))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for a given path
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}
