//! Reload coordinator: fetches the polygon collection from the
//! segmentation backend with retry, backoff, and cancellation.
//!
//! The interaction core is synchronous; this is the only asynchronous path
//! in the engine. A newer reload for the same image always supersedes and
//! cancels an older one, so at most one reload's result is ever applied.
//! Transient failures retry on a 1s/2s/4s schedule; "not found" and
//! cancellation are terminal and never retried.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Notify;

use crate::constants::{DEFAULT_RELOAD_ATTEMPTS, DEFAULT_RELOAD_BASE_DELAY_MS};
use crate::model::{ParsedCollection, SegmentationPayload, parse_collection};

// ============================================================================
// Cancellation
// ============================================================================

/// A handle allowing an in-flight fetch to be aborted when superseded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation; wakes every waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Check whether cancellation was signalled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until cancellation is signalled.
    pub async fn cancelled(&self) {
        let mut notified = std::pin::pin!(self.inner.notify.notified());
        loop {
            // Register the waiter before the flag check, otherwise a cancel
            // between check and await would be missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.as_mut().await;
            notified.set(self.inner.notify.notified());
        }
    }

    fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ============================================================================
// Fetch Interface
// ============================================================================

/// Errors a segmentation fetch can produce.
///
/// Absence of a segmentation is not an error; it is modeled as a payload
/// with `polygons: null`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network-level failure worth retrying
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The fetch observed its cancellation token
    #[error("fetch aborted")]
    Cancelled,
}

/// Backend segmentation API surface the coordinator talks to.
pub trait SegmentationFetch: Send + Sync {
    /// Fetch the segmentation payload for an image. Implementations should
    /// watch `cancel` and bail out with [`FetchError::Cancelled`] when it
    /// fires; the coordinator also races the token itself, so a fetch that
    /// ignores it is still superseded correctly.
    fn fetch(
        &self,
        image_id: &str,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<SegmentationPayload, FetchError>> + Send;
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Explicit retry schedule, injectable for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total fetch attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RELOAD_ATTEMPTS,
            base_delay_ms: DEFAULT_RELOAD_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): 1s, 2s, 4s, ...
    pub fn delay(&self, retry: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << retry.min(16)))
    }

    /// Whether an error is worth another attempt.
    pub fn is_retryable(&self, error: &FetchError) -> bool {
        matches!(error, FetchError::Transient(_))
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Terminal result of one reload request.
#[derive(Debug)]
pub enum ReloadOutcome {
    /// Fetch succeeded; the payload passed the parse boundary.
    Loaded(ParsedCollection),
    /// The backend has no segmentation for this image (terminal, silent).
    NotFound,
    /// Superseded by a newer reload or explicitly aborted (terminal,
    /// silent).
    Cancelled,
    /// Retries exhausted; surfaced to the user as a warning.
    Failed(FetchError),
}

/// Coordinates reloads so that, per image, only the newest request can
/// deliver a result.
pub struct ReloadCoordinator<F> {
    fetcher: F,
    policy: RetryPolicy,
    inflight: Mutex<HashMap<String, CancelToken>>,
}

impl<F: SegmentationFetch> ReloadCoordinator<F> {
    pub fn new(fetcher: F, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            policy,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Cancel any in-flight reload for `image_id`.
    pub fn cancel(&self, image_id: &str) {
        if let Some(token) = self.lock_inflight().remove(image_id) {
            token.cancel();
        }
    }

    /// Fetch the polygon collection for `image_id`, superseding any reload
    /// already in flight for the same image.
    pub async fn reload(&self, image_id: &str) -> ReloadOutcome {
        let token = CancelToken::new();
        if let Some(previous) = self
            .lock_inflight()
            .insert(image_id.to_string(), token.clone())
        {
            log::debug!("reload '{image_id}': superseding in-flight request");
            previous.cancel();
        }

        let outcome = self.run(image_id, &token).await;

        // Only the request that still owns the slot clears it.
        let mut inflight = self.lock_inflight();
        if inflight.get(image_id).is_some_and(|t| t.same_as(&token)) {
            inflight.remove(image_id);
        }
        outcome
    }

    async fn run(&self, image_id: &str, token: &CancelToken) -> ReloadOutcome {
        let mut attempt = 0u32;
        loop {
            if token.is_cancelled() {
                return ReloadOutcome::Cancelled;
            }

            let result = tokio::select! {
                _ = token.cancelled() => return ReloadOutcome::Cancelled,
                result = self.fetcher.fetch(image_id, token) => result,
            };

            match result {
                Ok(payload) => {
                    // Superseded while the response was resolving: discard.
                    if token.is_cancelled() {
                        return ReloadOutcome::Cancelled;
                    }
                    return match payload.polygons {
                        None => ReloadOutcome::NotFound,
                        Some(raws) => ReloadOutcome::Loaded(parse_collection(raws)),
                    };
                }
                Err(FetchError::Cancelled) => return ReloadOutcome::Cancelled,
                Err(error) => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts || !self.policy.is_retryable(&error) {
                        log::error!(
                            "reload '{image_id}' failed after {attempt} attempt(s): {error}"
                        );
                        return ReloadOutcome::Failed(error);
                    }
                    let delay = self.policy.delay(attempt - 1);
                    log::warn!("reload '{image_id}': {error}; retrying in {delay:?}");
                    tokio::select! {
                        _ = token.cancelled() => return ReloadOutcome::Cancelled,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<String, CancelToken>> {
        // Nothing inside the lock can panic, but recover anyway.
        self.inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================
