//! Batch orchestrator
//!
//! The `SatDownloader` struct and its methods are organized by concern:
//! - [`batch`] - the authenticate, discover, fetch and extract sequence
//! - [`progress`] - caller-facing progress callbacks
//!
//! Progress is reported two ways: synchronously through a [`ProgressObserver`]
//! passed to [`SatDownloader::download_invoices`], and asynchronously through
//! the [`Event`](crate::types::Event) broadcast channel returned by
//! [`SatDownloader::subscribe`].

mod batch;
mod progress;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use progress::{FnProgress, ProgressObserver};

use crate::client::{SatClient, SatService};
use crate::config::Config;
use crate::error::Result;
use crate::types::{BatchSummary, DownloadRequest, Event};
use std::sync::Arc;

/// Capacity of the event broadcast channel; slow subscribers beyond this lag
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Main entry point: runs batch downloads against the SAT service
///
/// A downloader holds no state between runs; every call to
/// [`download_invoices`](Self::download_invoices) authenticates and discovers
/// packages from scratch.
pub struct SatDownloader {
    /// Remote service (reqwest-backed in production)
    pub(crate) service: Arc<dyn SatService>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
}

impl std::fmt::Debug for SatDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SatDownloader")
            .field("config", &self.config)
            .field("subscribers", &self.event_tx.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SatDownloader {
    /// Create a downloader talking to the endpoints in `config`
    ///
    /// The configuration is validated first.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = SatClient::new(&config)?;
        Ok(Self::build(config, Arc::new(client)))
    }

    /// Create a downloader driving a custom [`SatService`] implementation
    pub fn with_service(config: Config, service: Arc<dyn SatService>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, service))
    }

    fn build(config: Config, service: Arc<dyn SatService>) -> Self {
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            event_tx,
            config: Arc::new(config),
        }
    }

    /// Subscribe to batch events
    ///
    /// Each subscriber receives every event emitted after it subscribed. This is
    /// how an interactive front end follows a batch running on another task
    /// without touching the downloader's state.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sat_dl::{Config, Event, SatDownloader};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = SatDownloader::new(Config::default())?;
    /// let mut events = downloader.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         if let Event::PackageExtracted { index, total, .. } = event {
    ///             println!("package {}/{}", index, total);
    ///         }
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Build a request that writes into the configured output directory
    pub fn request(
        &self,
        credentials: crate::types::Credentials,
        range: crate::types::DateRange,
    ) -> DownloadRequest {
        DownloadRequest {
            credentials,
            range,
            output_dir: self.config.output_dir.clone(),
        }
    }

    /// Run a batch on a background task
    ///
    /// Progress is only reported through [`subscribe`](Self::subscribe); the
    /// handle resolves to the same result as
    /// [`download_invoices`](Self::download_invoices).
    pub fn spawn(
        self: &Arc<Self>,
        request: DownloadRequest,
    ) -> tokio::task::JoinHandle<Result<BatchSummary>> {
        let downloader = Arc::clone(self);
        tokio::spawn(async move { downloader.download_invoices(&request, &mut ()).await })
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
