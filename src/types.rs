//! Core types for sat-dl

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Date format accepted for the query range (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque identifier of a server-side package, as returned by discovery
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(pub String);

impl PackageId {
    /// Create a new PackageId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used for the downloaded archive (`<id>.zip`)
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.0)
    }

    /// Whether the identifier can be used as a single path segment and file name
    pub(crate) fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\'])
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PackageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-certificate credentials for one batch run
///
/// The password is never printed by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    /// Taxpayer identifier (RFC) scoping the discovery query
    pub rfc: String,
    /// Path to the certificate file (.cer)
    pub certificate_path: PathBuf,
    /// Path to the private key file (.key)
    pub private_key_path: PathBuf,
    /// Password protecting the private key
    pub password: String,
}

impl Credentials {
    /// Build credentials, trimming surrounding whitespace from every field
    pub fn new(
        rfc: impl AsRef<str>,
        certificate_path: impl AsRef<str>,
        private_key_path: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Self {
        Self {
            rfc: rfc.as_ref().trim().to_string(),
            certificate_path: PathBuf::from(certificate_path.as_ref().trim()),
            private_key_path: PathBuf::from(private_key_path.as_ref().trim()),
            password: password.as_ref().trim().to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("rfc", &self.rfc)
            .field("certificate_path", &self.certificate_path)
            .field("private_key_path", &self.private_key_path)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Inclusive date range for the discovery query
///
/// Ordering is not checked here; the service decides what an inverted range means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range
    pub start: NaiveDate,
    /// Last day of the range
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range from two dates
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse a range from two `YYYY-MM-DD` strings (surrounding whitespace is ignored)
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: parse_date("start_date", start)?,
            end: parse_date("end_date", end)?,
        })
    }
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        Error::config(
            key,
            format!("invalid date '{}' (expected YYYY-MM-DD): {}", value.trim(), e),
        )
    })
}

/// Everything one batch run needs
#[derive(Clone, Debug)]
pub struct DownloadRequest {
    /// Credentials used for authentication and discovery
    pub credentials: Credentials,
    /// Discovery date range
    pub range: DateRange,
    /// Directory receiving archives and extracted documents; must already exist
    pub output_dir: PathBuf,
}

/// Result of processing a single package
///
/// A failed package is recorded here instead of aborting the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PackageOutcome {
    /// Archive downloaded and extracted
    Extracted {
        /// Package identifier
        package_id: PackageId,
        /// 1-based position in the discovery order
        index: usize,
        /// Local archive path
        archive: PathBuf,
        /// Extracted documents, in archive order
        documents: Vec<PathBuf>,
    },
    /// Download or extraction failed; the package was skipped
    Failed {
        /// Package identifier
        package_id: PackageId,
        /// 1-based position in the discovery order
        index: usize,
        /// Error message
        error: String,
    },
}

impl PackageOutcome {
    /// The package this outcome belongs to
    pub fn package_id(&self) -> &PackageId {
        match self {
            PackageOutcome::Extracted { package_id, .. } => package_id,
            PackageOutcome::Failed { package_id, .. } => package_id,
        }
    }

    /// Whether the package was downloaded and extracted
    pub fn is_success(&self) -> bool {
        matches!(self, PackageOutcome::Extracted { .. })
    }
}

/// Aggregate result of a batch run
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of packages discovered
    pub total: usize,
    /// One outcome per discovered package, in discovery order
    pub outcomes: Vec<PackageOutcome>,
}

impl BatchSummary {
    /// Number of packages downloaded and extracted
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of packages skipped because of an error
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// All extracted documents across the batch
    pub fn documents(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().flat_map(|o| match o {
            PackageOutcome::Extracted { documents, .. } => documents.as_slice(),
            PackageOutcome::Failed { .. } => &[],
        })
    }
}

/// Event emitted during a batch run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Authentication succeeded
    Authenticated,

    /// Discovery finished; emitted once, even when no packages were found
    BatchStarted {
        /// Number of packages discovered
        total: usize,
    },

    /// A package was downloaded and extracted
    PackageExtracted {
        /// 1-based position in the discovery order
        index: usize,
        /// Number of packages discovered
        total: usize,
        /// Package identifier
        package_id: PackageId,
        /// Number of documents written
        documents: usize,
    },

    /// A package failed and was skipped
    PackageFailed {
        /// 1-based position in the discovery order
        index: usize,
        /// Number of packages discovered
        total: usize,
        /// Package identifier
        package_id: PackageId,
        /// Error message
        error: String,
    },

    /// The batch ran to completion
    Finished {
        /// Number of packages discovered
        total: usize,
        /// Packages downloaded and extracted
        succeeded: usize,
        /// Packages skipped
        failed: usize,
    },

    /// Authentication or discovery failed; nothing was downloaded
    Aborted {
        /// Error message
        error: String,
    },
}
