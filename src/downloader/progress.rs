/// Receives progress callbacks from [`SatDownloader::download_invoices`](super::SatDownloader::download_invoices)
///
/// Callbacks run on the task executing the batch. A front end that must update
/// its display on its own thread should forward them (or use
/// [`subscribe`](super::SatDownloader::subscribe) instead).
pub trait ProgressObserver {
    /// Called exactly once after discovery, before any package is processed,
    /// with `current == 0`; also called when no packages were found
    fn on_batch_start(&mut self, _total: usize, _current: usize) {}

    /// Called after a package was downloaded and extracted
    ///
    /// `current` is the package's 1-based position in discovery order, so
    /// skipped packages leave gaps.
    fn on_progress(&mut self, _current: usize, _total: usize) {}
}

/// No progress reporting
impl ProgressObserver for () {}

/// [`ProgressObserver`] built from two closures
///
/// # Example
///
/// ```
/// use sat_dl::{FnProgress, ProgressObserver};
///
/// let mut seen = Vec::new();
/// let mut progress = FnProgress::new(
///     |total, _| println!("{} packages", total),
///     |current, total| seen.push((current, total)),
/// );
/// progress.on_progress(1, 2);
/// drop(progress);
/// assert_eq!(seen, vec![(1, 2)]);
/// ```
pub struct FnProgress<B, P> {
    on_batch_start: B,
    on_progress: P,
}

impl<B, P> FnProgress<B, P>
where
    B: FnMut(usize, usize),
    P: FnMut(usize, usize),
{
    /// Wrap a batch-start callback and a per-package callback
    pub fn new(on_batch_start: B, on_progress: P) -> Self {
        Self {
            on_batch_start,
            on_progress,
        }
    }
}

impl<B, P> ProgressObserver for FnProgress<B, P>
where
    B: FnMut(usize, usize),
    P: FnMut(usize, usize),
{
    fn on_batch_start(&mut self, total: usize, current: usize) {
        (self.on_batch_start)(total, current)
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        (self.on_progress)(current, total)
    }
}
