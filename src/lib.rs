//! # sat-dl
//!
//! Batch downloader for CFDI invoice packages from the SAT mass-download service.
//!
//! ## How a batch runs
//!
//! A batch is a single straight-line pass:
//!
//! 1. **Authenticate** with certificate, private key and password to obtain a bearer token
//! 2. **Discover** the package identifiers available for a taxpayer and date range
//! 3. For each package, **fetch** the zip archive and **extract** its XML documents
//!
//! Authentication and discovery failures abort the batch. A package that fails to
//! download or extract is logged, recorded in the [`BatchSummary`] and skipped.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sat_dl::{Config, Credentials, DateRange, FnProgress, SatDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = SatDownloader::new(Config::default())?;
//!
//!     let request = downloader.request(
//!         Credentials::new("AAA010101AAA", "fiel.cer", "fiel.key", "password"),
//!         DateRange::parse("2024-01-01", "2024-01-31")?,
//!     );
//!     std::fs::create_dir_all(&request.output_dir)?;
//!
//!     let mut progress = FnProgress::new(
//!         |total, _| println!("{} packages", total),
//!         |current, total| println!("package {}/{}", current, total),
//!     );
//!     let summary = downloader.download_invoices(&request, &mut progress).await?;
//!     println!("{} extracted, {} failed", summary.succeeded(), summary.failed());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// SAT service HTTP client
pub mod client;
/// Configuration types
pub mod config;
/// Batch orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Package archive extraction
pub mod extraction;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use client::{SatClient, SatService};
pub use config::{Config, EndpointConfig, TimeoutConfig};
pub use downloader::{FnProgress, ProgressObserver, SatDownloader};
pub use error::{Error, Result};
pub use types::{
    BatchSummary, Credentials, DateRange, DownloadRequest, Event, PackageId, PackageOutcome,
};
