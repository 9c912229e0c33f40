//! Concurrent platform pipelines for async runtimes (Tokio, etc.).
//!
//! Each platform's fetch-and-compute pipeline runs on the blocking thread
//! pool via [`tokio::task::spawn_blocking`]; platforms share no data, so they
//! proceed in parallel. The cross-platform join waits for all of them.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use share_of_search::sources::{StaticSource, VolumeSource};
//! use share_of_search::{AsyncShareOfSearch, Platform, ShareOfSearch};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sos = ShareOfSearch::builder()
//!         .target_brand("LampTwist")
//!         .competitors(["MOHD"])
//!         .build()
//!         .unwrap();
//!     let runner = AsyncShareOfSearch::new(sos);
//!
//!     let google: Arc<dyn VolumeSource> = Arc::new(StaticSource::new(Platform::Google));
//!     let amazon: Arc<dyn VolumeSource> = Arc::new(StaticSource::new(Platform::Amazon));
//!     let report = runner.run(vec![google, amazon]).await.unwrap();
//! }
//! ```

use std::sync::Arc;

use tracing::warn;

use crate::error::{Result, SosError};
use crate::pipeline::{PlatformReport, RunReport};
use crate::sources::VolumeSource;
use crate::ShareOfSearch;

// ---------------------------------------------------------------------------
// AsyncShareOfSearch
// ---------------------------------------------------------------------------

/// Async wrapper around [`ShareOfSearch`].
///
/// The analysis is immutable, so it is shared across tasks through an
/// [`Arc`] without locking.
#[derive(Clone)]
pub struct AsyncShareOfSearch {
    inner: Arc<ShareOfSearch>,
}

impl AsyncShareOfSearch {
    pub fn new(sos: ShareOfSearch) -> Self {
        Self {
            inner: Arc::new(sos),
        }
    }

    /// Access the wrapped analysis.
    pub fn inner(&self) -> &ShareOfSearch {
        &self.inner
    }

    /// Run one platform pipeline on the blocking pool.
    pub async fn analyze(&self, source: Arc<dyn VolumeSource>) -> Result<PlatformReport> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.analyze(source.as_ref()))
            .await
            .map_err(|e| SosError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Run every platform concurrently, then combine.
    ///
    /// A pipeline whose task panics is reported as a failed platform and
    /// contributes nothing to the combination. Cancellation of any pipeline
    /// cancels the run.
    pub async fn run(&self, sources: Vec<Arc<dyn VolumeSource>>) -> Result<RunReport> {
        crate::check_distinct_platforms(sources.iter().map(|s| s.platform()))?;

        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let platform = source.platform();
                let inner = Arc::clone(&self.inner);
                let handle = tokio::task::spawn_blocking(move || inner.analyze(source.as_ref()));
                (platform, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (platform, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => return Err(e),
                Err(e) => {
                    warn!(%platform, error = %e, "platform task failed");
                    reports.push(PlatformReport::failed(
                        platform,
                        format!("task failed: {e}"),
                        Vec::new(),
                    ));
                }
            }
        }

        Ok(RunReport::assemble(
            self.inner.target_brand(),
            self.inner.period().clone(),
            reports,
        ))
    }
}
