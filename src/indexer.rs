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

//! The dispatch loop.
//!
//! One block at a time: wait until it is finalized, fetch its events once,
//! hand the allow-listed ones to every sink taking part in the block, then
//! persist all checkpoints in a single write before planning the next block.

use crate::chain::head::spawn_head_watcher;
use crate::chain::{ChainClient, LatestHead};
use crate::checkpoint::{OffchainState, SinkCheckpoint};
use crate::clock::{Ticker, TokioTicker};
use crate::config::IndexerConfig;
use crate::error::IndexerError;
use crate::filter::EventFilter;
use crate::handler::SinkHandler;
use crate::reconciler::{reconcile, BlockPlan, Reconciliation, SinkCursor, SinkStatus};
use crate::retry::{is_retryable_error, retry_with_backoff, with_timeout, CircuitBreaker, RetryConfig};
use crate::storage::CheckpointStore;
use crate::types::{BlockNumber, EventMeta};
use crate::validated_types::SinkName;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct Sink {
    name: SinkName,
    handler: Arc<dyn SinkHandler>,
    cursor: SinkCursor,
}

pub struct Indexer<Ch: ChainClient> {
    retry_config: RetryConfig,
    circuit_breaker: CircuitBreaker,
    chain: Ch,
    store: Box<dyn CheckpointStore>,
    sinks: Vec<Sink>,
    filter: EventFilter,
    ticker: Arc<dyn Ticker>,
    config: IndexerConfig,
    state: OffchainState,
    latest_head: LatestHead,
}

impl<Ch: ChainClient> Indexer<Ch> {
    pub fn new(chain: Ch, store: Box<dyn CheckpointStore>, config: IndexerConfig) -> Self {
        Self {
            retry_config: RetryConfig::default(),
            circuit_breaker: CircuitBreaker::new(3, Duration::from_secs(60)),
            chain,
            store,
            sinks: Vec::new(),
            filter: EventFilter::default_methods(),
            ticker: Arc::new(TokioTicker),
            config,
            state: OffchainState::new(),
            latest_head: LatestHead::detached(),
        }
    }

    /// Register a sink under `name`, the key of its checkpoint.
    pub fn add_sink(
        &mut self,
        name: &str,
        handler: impl SinkHandler + 'static,
    ) -> Result<(), IndexerError> {
        self.add_dyn_sink(name, Arc::new(handler))
    }

    pub fn add_dyn_sink(
        &mut self,
        name: &str,
        handler: Arc<dyn SinkHandler>,
    ) -> Result<(), IndexerError> {
        let name = SinkName::parse(name)?;
        if self.sinks.iter().any(|s| s.name == name) {
            return Err(IndexerError::invalid_config(
                "sink",
                format!("`{name}` registered twice"),
            ));
        }
        self.sinks.push(Sink {
            name,
            handler,
            cursor: SinkCursor::active(self.config.initial_block()),
        });
        Ok(())
    }

    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    pub fn set_ticker(&mut self, ticker: Arc<dyn Ticker>) {
        self.ticker = ticker;
    }

    pub fn set_retry_config(&mut self, retry_config: RetryConfig) {
        self.retry_config = retry_config;
    }

    pub fn chain(&self) -> &Ch {
        &self.chain
    }

    /// The offchain state as of the last load or block.
    pub fn state(&self) -> &OffchainState {
        &self.state
    }

    pub fn sink_status(&self, name: &str) -> Option<&SinkStatus> {
        self.sinks
            .iter()
            .find(|s| s.name.as_str() == name)
            .map(|s| s.cursor.status())
    }

    pub fn latest_head(&self) -> Option<BlockNumber> {
        self.latest_head.get()
    }

    async fn with_circuit_breaker<F, Fut, T>(
        &self,
        operation: &str,
        mut op: F,
    ) -> Result<T, IndexerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, IndexerError>>,
    {
        if self.circuit_breaker.is_open() {
            return Err(IndexerError::CircuitOpen {
                operation: operation.into(),
            });
        }
        let limit = self.config.chain_timeout;
        let res = retry_with_backoff(
            || with_timeout(operation, limit, op()),
            &self.retry_config,
            &self.circuit_breaker,
        )
        .await;
        match &res {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(e) => {
                if is_retryable_error(e) {
                    self.circuit_breaker.record_failure();
                }
            }
        }
        res
    }

    /// Run until every sink has failed, `end_block` is reached, or a chain
    /// or storage error makes further progress impossible.
    pub async fn run(&mut self) -> Result<(), IndexerError> {
        if self.sinks.is_empty() {
            return Err(IndexerError::invalid_config(
                "sinks",
                "at least one sink is required",
            ));
        }
        self.load_state().await?;

        let heads = self
            .with_circuit_breaker("subscribe_new_heads", || self.chain.subscribe_new_heads())
            .await?;
        let (latest_head, watcher) = spawn_head_watcher(heads);
        self.latest_head = latest_head;

        let res = self.dispatch().await;
        watcher.abort();
        res
    }

    async fn load_state(&mut self) -> Result<(), IndexerError> {
        let mut state = self.store.read_state().await?;
        let cleared = state.clear_errors();
        if !cleared.is_empty() {
            info!(target: "indexer", sinks = ?cleared, "cleared sink errors from the previous run");
        }

        let initial = self.config.initial_block();
        for sink in &mut self.sinks {
            let checkpoint = state
                .get(sink.name.as_str())
                .cloned()
                .unwrap_or_else(|| SinkCheckpoint::at(initial));
            sink.cursor = SinkCursor::resume(&checkpoint);
            state.set(sink.name.as_str(), checkpoint);
            info!(
                target: "indexer",
                sink = %sink.name,
                last_block = sink.cursor.last_processed_block(),
                "resuming sink"
            );
        }
        self.state = state;
        Ok(())
    }

    async fn dispatch(&mut self) -> Result<(), IndexerError> {
        let interval = self
            .config
            .block_interval(self.chain.minimum_block_period());
        info!(
            target: "indexer",
            events = ?self.filter.entries(),
            interval = ?interval,
            "dispatching finalized blocks"
        );

        let mut finalized = self
            .with_circuit_breaker("best_finalized_block_number", || {
                self.chain.best_finalized_block_number()
            })
            .await?;

        loop {
            let cursors: Vec<SinkCursor> = self.sinks.iter().map(|s| s.cursor.clone()).collect();
            let plan = match reconcile(&cursors) {
                Reconciliation::Fetch(plan) => plan,
                Reconciliation::Halt => return Err(self.halt()),
            };

            if let Some(end) = self.config.end_block {
                if plan.block > end {
                    info!(target: "indexer", end, "end block reached");
                    return Ok(());
                }
            }

            finalized = self
                .wait_for_finality(plan.block, finalized, interval)
                .await?;
            self.process_block(&plan).await?;
        }
    }

    fn halt(&self) -> IndexerError {
        for sink in &self.sinks {
            if let SinkStatus::Faulted { error } = sink.cursor.status() {
                error!(
                    target: "indexer",
                    sink = %sink.name,
                    last_block = sink.cursor.last_processed_block(),
                    "sink failed: {error}"
                );
            }
        }
        let block = self
            .sinks
            .iter()
            .map(|s| s.cursor.last_processed_block())
            .max()
            .unwrap_or_default()
            + 1;
        error!(
            target: "indexer",
            block,
            "every sink failed, halting; fix the cause and restart the indexer"
        );
        IndexerError::AllSinksFailed { block }
    }

    async fn wait_for_finality(
        &self,
        block: BlockNumber,
        mut finalized: BlockNumber,
        interval: Duration,
    ) -> Result<BlockNumber, IndexerError> {
        while finalized < block {
            debug!(
                target: "indexer",
                block,
                finalized,
                head = ?self.latest_head.get(),
                "waiting for the best finalized block"
            );
            self.ticker.tick(interval).await;

            // Finality never runs ahead of the head we have seen.
            if matches!(self.latest_head.get(), Some(head) if head < block) {
                continue;
            }
            finalized = self
                .with_circuit_breaker("best_finalized_block_number", || {
                    self.chain.best_finalized_block_number()
                })
                .await?;
        }
        Ok(finalized)
    }

    async fn deliver(&self, sink: &Sink, event: &EventMeta) -> Result<(), IndexerError> {
        let operation = format!("sink {}", sink.name);
        let res = with_timeout(
            &operation,
            self.config.sink_timeout,
            sink.handler.handle_event(event),
        )
        .await;
        if let Err(e) = &res {
            sink.handler.handle_error(e, event).await;
        }
        res
    }

    async fn process_block(&mut self, plan: &BlockPlan) -> Result<(), IndexerError> {
        let block = plan.block;
        let hash = self
            .with_circuit_breaker("block_hash", || self.chain.block_hash(block))
            .await?;
        let mut events = self
            .with_circuit_breaker("events_at", || self.chain.events_at(&hash))
            .await?;
        events.sort_by_key(|e| e.index);
        let timestamp = if events.iter().any(|e| self.filter.accepts(e)) {
            self.with_circuit_breaker("block_timestamp", || self.chain.block_timestamp(&hash))
                .await?
        } else {
            None
        };

        let mut participating: Vec<usize> = plan.participants().collect();
        debug!(
            target: "indexer",
            block,
            hash = ?hash,
            events = events.len(),
            sinks = ?participating
                .iter()
                .map(|&i| self.sinks[i].name.as_str())
                .collect::<Vec<_>>(),
            "processing block"
        );

        let mut failures: Vec<(usize, IndexerError)> = Vec::new();
        for event in events {
            if participating.is_empty() {
                break;
            }
            if !self.filter.accepts(&event) {
                continue;
            }
            let meta = EventMeta::from_event(event, block).with_timestamp(timestamp);
            debug!(
                target: "indexer",
                block,
                index = meta.event_index,
                event = %meta.event_name,
                "dispatching event"
            );

            let this: &Self = self;
            let meta = &meta;
            let deliveries = participating
                .iter()
                .map(|&i| async move { (i, this.deliver(&this.sinks[i], meta).await) });
            let results = join_all(deliveries).await;
            for (i, res) in results {
                if let Err(e) = res {
                    participating.retain(|&p| p != i);
                    failures.push((i, e));
                }
            }
        }

        for (i, e) in failures {
            let sink = &mut self.sinks[i];
            warn!(
                target: "indexer",
                sink = %sink.name,
                block,
                "sink failed, disabled until restart: {e}"
            );
            sink.cursor.fault(block, e.to_string());
        }
        for i in participating {
            self.sinks[i].cursor.advance(block);
        }

        for sink in &self.sinks {
            self.state.set(sink.name.as_str(), sink.cursor.checkpoint());
        }
        self.store.write_state(&self.state).await
    }
}
