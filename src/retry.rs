/*
 * Copyright 2025 Flamewire
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};

use crate::error::IndexerError;
use tracing::warn;

/// Backoff for chain requests. Sink calls are never retried.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay to use after waiting `delay`, capped at `max_delay`.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        let next = (delay.as_millis() as f32 * self.backoff_multiplier) as u64;
        Duration::from_millis(next).min(self.max_delay)
    }
}

/// Opens after `threshold` consecutive exhausted chain requests and refuses
/// new ones until `cooldown` has passed.
pub struct CircuitBreaker {
    failures: AtomicUsize,
    threshold: usize,
    cooldown: Duration,
    open_until: Mutex<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(threshold: usize, cooldown: Duration) -> Self {
        Self {
            failures: AtomicUsize::new(0),
            threshold,
            cooldown,
            open_until: Mutex::new(None),
        }
    }

    fn open_until(&self) -> MutexGuard<'_, Option<Instant>> {
        self.open_until
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.open_until(), Some(until) if Instant::now() < until)
    }

    pub fn record_success(&self) {
        self.failures.store(0, Ordering::Relaxed);
        *self.open_until() = None;
    }

    pub fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.threshold {
            *self.open_until() = Some(Instant::now() + self.cooldown);
            self.failures.store(0, Ordering::Relaxed);
        }
    }
}

fn is_retryable_subxt_error(err: &subxt::Error) -> bool {
    if err.is_rpc_limit_reached() {
        return false;
    }
    if let subxt::Error::Rpc(subxt::error::RpcError::ClientError(_)) = err {
        return false;
    }
    true
}

/// Whether repeating the chain request that produced `err` can succeed.
pub fn is_retryable_error(err: &IndexerError) -> bool {
    match err {
        IndexerError::BlockNotFound { .. }
        | IndexerError::InvalidConfig { .. }
        | IndexerError::CircuitOpen { .. }
        | IndexerError::AllSinksFailed { .. }
        | IndexerError::HandlerFailed { .. }
        | IndexerError::CheckpointError { .. }
        | IndexerError::SerdeJson(_) => false,
        IndexerError::Subxt(e)
        | IndexerError::ConnectionFailed { source: e, .. }
        | IndexerError::MetadataUpdateFailed { source: e } => is_retryable_subxt_error(e.as_ref()),
        _ => true,
    }
}

/// Run `fut`, failing with [`IndexerError::Timeout`] once `limit` elapses.
pub async fn with_timeout<Fut, T>(
    operation: &str,
    limit: Duration,
    fut: Fut,
) -> Result<T, IndexerError>
where
    Fut: Future<Output = Result<T, IndexerError>>,
{
    match timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(IndexerError::Timeout {
            operation: operation.to_string(),
            after: limit,
        }),
    }
}

pub async fn retry_with_backoff<F, Fut, T>(
    mut op: F,
    config: &RetryConfig,
    circuit_breaker: &CircuitBreaker,
) -> Result<T, IndexerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IndexerError>>,
{
    let mut delay = config.initial_delay;
    let attempts = config.max_retries.max(1);
    let mut attempt = 0;
    loop {
        if circuit_breaker.is_open() {
            return Err(IndexerError::CircuitOpen {
                operation: "chain request".into(),
            });
        }
        match op().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                attempt += 1;
                if !is_retryable_error(&e) || attempt >= attempts {
                    return Err(e);
                }
                warn!(target: "indexer", "retrying in {:?} after error: {}", delay, e);
                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}
