use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use moka::future::Cache;
use teloxide::RequestError;

use super::{RecordError, Recorder, Submission};
use crate::core::config;

const DEDUPE_CAPACITY: u64 = 10_000;

/// Retries transient failures of the wrapped recorder and drops repeats.
///
/// A submission whose idempotency key was recorded within the dedupe
/// window is acknowledged without calling the backend again. Keys are
/// remembered only after a successful write, so a failed submission can
/// be sent again right away.
pub struct ReliableRecorder {
    inner: Arc<dyn Recorder>,
    backoff: ExponentialBuilder,
    window: Duration,
    recent: Option<Cache<String, ()>>,
}

impl ReliableRecorder {
    /// `max_attempts` counts the first try; a zero `window` disables dedupe.
    pub fn new(
        inner: Arc<dyn Recorder>,
        max_attempts: usize,
        min_delay: Duration,
        max_delay: Duration,
        window: Duration,
    ) -> Self {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(max_delay)
            .with_max_times(max_attempts.saturating_sub(1))
            .with_jitter();

        let recent = (!window.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(DEDUPE_CAPACITY)
                .time_to_live(window)
                .build()
        });

        Self {
            inner,
            backoff,
            window,
            recent,
        }
    }

    pub fn from_config(inner: Arc<dyn Recorder>) -> Self {
        Self::new(
            inner,
            *config::recording::MAX_ATTEMPTS,
            config::recording::retry_min_delay(),
            config::recording::retry_max_delay(),
            config::recording::dedupe_window(),
        )
    }
}

#[async_trait]
impl Recorder for ReliableRecorder {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn record(&self, submission: &Submission) -> Result<(), RecordError> {
        let key = self.recent.as_ref().map(|_| submission.idempotency_key(self.window));

        if let (Some(cache), Some(key)) = (&self.recent, &key) {
            if cache.contains_key(key) {
                log::info!(
                    "Duplicate submission from user {} ({}), not recording again",
                    submission.user_id,
                    submission.link
                );
                return Ok(());
            }
        }

        let inner = &self.inner;
        (|| async move { inner.record(submission).await })
            .retry(self.backoff)
            .when(|e: &RecordError| e.is_transient())
            .adjust(|e: &RecordError, delay: Option<Duration>| match e {
                // Flood control: wait as long as Telegram asked, not the backoff step
                RecordError::Telegram(RequestError::RetryAfter(wait)) => delay.map(|_| wait.duration()),
                _ => delay,
            })
            .notify(|e: &RecordError, delay: Duration| {
                log::warn!("{} recorder failed: {}. Retrying in {:?}", inner.name(), e, delay);
            })
            .await?;

        if let (Some(cache), Some(key)) = (&self.recent, key) {
            cache.insert(key, ()).await;
        }
        Ok(())
    }
}
