//! Batch search orchestration.
//!
//! Drives a whole equipped set through the search endpoint one query at a
//! time. The endpoint enforces a global per-account rate limit, so dispatch
//! is strictly sequential with a fixed inter-request delay; submitting
//! concurrently would only trade one search's wait for everyone's 429s.
//! Cancellation is cooperative: the token is checked at every suspension
//! point, and an in-flight request is allowed to finish before the flag is
//! honored.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::client::{SearchEndpoint, trade_result_url};
use crate::error::SearchError;
use crate::item::EquipmentSnapshot;
use crate::query::{QuerySynthesizer, SearchMode, TradeQuery};

/// Steady-state spacing between dispatches; roughly five searches a minute
/// stays under the endpoint's throughput ceiling.
const BASE_DISPATCH_DELAY: Duration = Duration::from_secs(12);

/// Upper bound for the doubled spacing after rate-limit hits.
const DISPATCH_DELAY_CAP: Duration = Duration::from_secs(30);

/// Wait when a rate-limit response names no duration of its own.
const RATE_LIMIT_FALLBACK_WAIT: Duration = Duration::from_secs(65);

/// Clamp band for rate-limit waits, whatever the endpoint suggests.
const RATE_LIMIT_WAIT_MIN: Duration = Duration::from_secs(60);
const RATE_LIMIT_WAIT_MAX: Duration = Duration::from_secs(180);

/// Safety margin on top of an endpoint-suggested wait.
const RATE_LIMIT_WAIT_BUFFER: Duration = Duration::from_secs(5);

/// Attempts per item before a rate-limited query counts as failed.
const MAX_ATTEMPTS_PER_ITEM: u32 = 3;

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Collecting,
    Dispatching,
    Completed,
    Cancelled,
}

/// One collected query with the name shown in progress reporting.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub query: TradeQuery,
    pub display_name: String,
}

/// Final tally of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub success_count: usize,
    pub error_count: usize,
    pub cancelled: bool,
}

/// Collaborator hooks for progress display and result handoff.
///
/// Every method has an empty default so observers implement only what they
/// show. Calls arrive strictly in dispatch order.
pub trait BatchObserver: Send + Sync {
    /// A new item is about to be dispatched (1-based `current`).
    fn on_progress(&self, _current: usize, _total: usize, _name: &str) {}

    /// Countdown tick while waiting out a rate limit.
    fn on_rate_limit_wait(&self, _remaining: Duration) {}

    /// A search was created; the URL is ready to open in a background tab.
    fn on_search_opened(&self, _url: &str) {}

    /// The run finished, was exhausted, or was cancelled.
    fn on_complete(&self, _report: &BatchReport) {}
}

/// No-op observer for headless runs.
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// Cooperative cancellation handle for a running batch.
///
/// Each run owns its own token, so cancelling one batch can never signal
/// another.
#[derive(Debug, Clone)]
pub struct BatchHandle {
    token: CancellationToken,
}

impl BatchHandle {
    /// Request cancellation. Takes effect at the next suspension-point
    /// check; an in-flight request completes first.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Outcome of dispatching one job, retries included.
enum DispatchOutcome {
    Success,
    Failed,
    Cancelled,
}

/// Sequentially submits collected queries with adaptive pacing.
pub struct BatchOrchestrator<E> {
    endpoint: Arc<E>,
    observer: Arc<dyn BatchObserver>,
    league: String,
    state: BatchState,
    token: CancellationToken,
}

impl<E: SearchEndpoint> BatchOrchestrator<E> {
    pub fn new(
        endpoint: Arc<E>,
        observer: Arc<dyn BatchObserver>,
        league: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            observer,
            league: league.into(),
            state: BatchState::Idle,
            token: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Handle for cancelling this run from another task.
    pub fn cancel_handle(&self) -> BatchHandle {
        BatchHandle {
            token: self.token.clone(),
        }
    }

    /// Collect Similar-mode queries for the whole snapshot and dispatch them
    /// in order. Items that fail synthesis are skipped during collection;
    /// a snapshot with nothing searchable completes immediately with zero
    /// counts.
    pub async fn run(
        &mut self,
        synthesizer: &QuerySynthesizer<'_>,
        snapshot: &EquipmentSnapshot,
    ) -> BatchReport {
        self.state = BatchState::Collecting;
        let jobs = collect_jobs(synthesizer, snapshot);

        if jobs.is_empty() {
            tracing::info!("No searchable items collected");
            self.state = BatchState::Completed;
            let report = BatchReport::default();
            self.observer.on_complete(&report);
            return report;
        }

        tracing::info!("Dispatching {} searches for league '{}'", jobs.len(), self.league);
        self.state = BatchState::Dispatching;
        let report = self.dispatch(&jobs).await;

        self.state = if report.cancelled {
            BatchState::Cancelled
        } else {
            BatchState::Completed
        };
        self.observer.on_complete(&report);
        report
    }

    async fn dispatch(&self, jobs: &[BatchJob]) -> BatchReport {
        let total = jobs.len();
        let mut report = BatchReport::default();
        let mut current_delay = BASE_DISPATCH_DELAY;

        for (idx, job) in jobs.iter().enumerate() {
            if self.token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            self.observer.on_progress(idx + 1, total, &job.display_name);

            match self.dispatch_one(job, &mut current_delay).await {
                DispatchOutcome::Success => report.success_count += 1,
                DispatchOutcome::Failed => report.error_count += 1,
                DispatchOutcome::Cancelled => {
                    report.cancelled = true;
                    break;
                }
            }

            // Steady-state spacing, skipped after the final item.
            if idx + 1 < total && !self.pause(current_delay).await {
                report.cancelled = true;
                break;
            }
        }

        report
    }

    /// Submit one job, waiting out rate limits and retrying the same query
    /// up to the attempt cap. Only rate limits are retried; anything else
    /// fails the item immediately.
    async fn dispatch_one(&self, job: &BatchJob, current_delay: &mut Duration) -> DispatchOutcome {
        let mut attempts = 0;

        loop {
            if self.token.is_cancelled() {
                return DispatchOutcome::Cancelled;
            }
            attempts += 1;

            match self.endpoint.submit(&job.query, &self.league).await {
                Ok(created) => {
                    let url = trade_result_url(&self.league, &created.id);
                    tracing::info!(
                        "Search for '{}' found {} listings: {}",
                        job.display_name,
                        created.total,
                        url
                    );
                    self.observer.on_search_opened(&url);
                    *current_delay = BASE_DISPATCH_DELAY;
                    return DispatchOutcome::Success;
                }
                Err(SearchError::RateLimited { retry_after }) => {
                    if attempts >= MAX_ATTEMPTS_PER_ITEM {
                        tracing::warn!(
                            "Giving up on '{}' after {} rate-limited attempts",
                            job.display_name,
                            attempts
                        );
                        return DispatchOutcome::Failed;
                    }

                    let wait = clamp_rate_limit_wait(retry_after);
                    tracing::warn!(
                        "Rate limited on '{}', waiting {}s before retry",
                        job.display_name,
                        wait.as_secs()
                    );
                    if !self.countdown(wait).await {
                        return DispatchOutcome::Cancelled;
                    }
                    *current_delay = (*current_delay * 2).min(DISPATCH_DELAY_CAP);
                }
                Err(err) => {
                    tracing::warn!("Search for '{}' failed: {}", job.display_name, err);
                    return DispatchOutcome::Failed;
                }
            }
        }
    }

    /// Wait out a rate limit with a once-a-second countdown. Returns false
    /// when cancelled mid-countdown.
    async fn countdown(&self, wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return true;
            }
            self.observer.on_rate_limit_wait(remaining);

            let step = remaining.min(Duration::from_secs(1));
            tokio::select! {
                () = self.token.cancelled() => return false,
                () = tokio::time::sleep(step) => {}
            }
        }
    }

    /// Inter-request pause. Returns false when cancelled while waiting.
    async fn pause(&self, delay: Duration) -> bool {
        tokio::select! {
            () = self.token.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }
}

/// Synthesize a Similar-mode query for every item across all categories, in
/// provider order. Synthesis failures are skipped with a diagnostic.
pub fn collect_jobs(
    synthesizer: &QuerySynthesizer<'_>,
    snapshot: &EquipmentSnapshot,
) -> Vec<BatchJob> {
    let mut jobs = Vec::with_capacity(snapshot.len());

    for (category, item) in snapshot.iter() {
        match synthesizer.synthesize(item, SearchMode::Similar) {
            Some(query) => jobs.push(BatchJob {
                query,
                display_name: item.display_name().to_string(),
            }),
            None => {
                tracing::debug!(
                    "Skipping unsearchable {} item '{}'",
                    category,
                    item.display_name()
                );
            }
        }
    }

    jobs
}

/// Apply the safety buffer and clamp band to a suggested wait.
fn clamp_rate_limit_wait(retry_after: Option<Duration>) -> Duration {
    let wait = retry_after.map_or(RATE_LIMIT_FALLBACK_WAIT, |d| d + RATE_LIMIT_WAIT_BUFFER);
    wait.clamp(RATE_LIMIT_WAIT_MIN, RATE_LIMIT_WAIT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_waits_are_buffered_and_clamped() {
        assert_eq!(
            clamp_rate_limit_wait(Some(Duration::from_secs(90))),
            Duration::from_secs(95)
        );
        // Short suggestions are pulled up to the minimum.
        assert_eq!(
            clamp_rate_limit_wait(Some(Duration::from_secs(10))),
            Duration::from_secs(60)
        );
        // Long suggestions are capped.
        assert_eq!(
            clamp_rate_limit_wait(Some(Duration::from_secs(600))),
            Duration::from_secs(180)
        );
        // No suggestion falls back to the fixed wait.
        assert_eq!(clamp_rate_limit_wait(None), Duration::from_secs(65));
    }
}
