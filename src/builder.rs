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

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use subxt::Config;

use crate::chain::{ChainClient, SubstrateChainClient};
use crate::clock::Ticker;
use crate::config::IndexerConfig;
use crate::error::IndexerError;
use crate::filter::EventFilter;
use crate::handler::SinkHandler;
use crate::indexer::Indexer;
use crate::retry::RetryConfig;
use crate::storage::init::init_store;
use crate::storage::CheckpointStore;
use crate::types::BlockNumber;
use crate::validated_types::WebSocketUrl;

/// Convenient builder for creating an [`Indexer`].
pub struct IndexerBuilder<C: Config> {
    node_url: Option<WebSocketUrl>,
    database_url: Option<String>,
    state_path: Option<PathBuf>,
    start_block: Option<BlockNumber>,
    end_block: Option<BlockNumber>,
    block_interval: Option<Duration>,
    chain_timeout: Option<Duration>,
    sink_timeout: Option<Duration>,
    filter: Option<EventFilter>,
    retry_config: Option<RetryConfig>,
    ticker: Option<Arc<dyn Ticker>>,
    store: Option<Box<dyn CheckpointStore>>,
    sinks: Vec<(String, Arc<dyn SinkHandler>)>,
    _marker: PhantomData<C>,
}

impl<C> Default for IndexerBuilder<C>
where
    C: Config + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> IndexerBuilder<C>
where
    C: Config + Send + Sync + 'static,
{
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            node_url: None,
            database_url: None,
            state_path: None,
            start_block: None,
            end_block: None,
            block_interval: None,
            chain_timeout: None,
            sink_timeout: None,
            filter: None,
            retry_config: None,
            ticker: None,
            store: None,
            sinks: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Start from the process environment (`SUBSTRATE_URL`, `DATABASE_URL`, ...).
    pub fn from_env() -> Result<Self, IndexerError> {
        let config = IndexerConfig::from_env()?;
        let mut builder = Self::new().connect(WebSocketUrl::parse(&config.node_url)?);
        builder.database_url = config.database_url;
        builder.state_path = config.state_path;
        builder.start_block = config.start_block;
        Ok(builder)
    }

    /// Connect to the given websocket URL.
    pub fn connect(mut self, url: WebSocketUrl) -> Self {
        self.node_url = Some(url);
        self
    }

    /// Keep the offchain state in PostgreSQL.
    pub fn with_postgres(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Keep the offchain state in SQLite.
    pub fn with_sqlite(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Keep the offchain state in a JSON file at `path`.
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    /// Use an already constructed store instead of one derived from URLs.
    pub fn with_store(mut self, store: Box<dyn CheckpointStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Start indexing from the specified block.
    pub fn start_from_block(mut self, block: BlockNumber) -> Self {
        self.start_block = Some(block);
        self
    }

    /// End indexing at the specified block.
    pub fn end_at_block(mut self, block: BlockNumber) -> Self {
        self.end_block = Some(block);
        self
    }

    /// Poll for finality at this interval instead of twice the chain's
    /// minimum block period.
    pub fn block_interval(mut self, interval: Duration) -> Self {
        self.block_interval = Some(interval);
        self
    }

    pub fn chain_timeout(mut self, timeout: Duration) -> Self {
        self.chain_timeout = Some(timeout);
        self
    }

    pub fn sink_timeout(mut self, timeout: Duration) -> Self {
        self.sink_timeout = Some(timeout);
        self
    }

    /// Restrict dispatch to the given event methods.
    pub fn events<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(EventFilter::methods(methods));
        self
    }

    pub fn event_filter(mut self, filter: EventFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    pub fn ticker(mut self, ticker: Arc<dyn Ticker>) -> Self {
        self.ticker = Some(ticker);
        self
    }

    /// Add a sink; `name` keys its checkpoint in the offchain state.
    pub fn add_sink(mut self, name: impl Into<String>, handler: impl SinkHandler + 'static) -> Self {
        self.sinks.push((name.into(), Arc::new(handler)));
        self
    }

    fn config(&self) -> Result<IndexerConfig, IndexerError> {
        let node_url = self
            .node_url
            .as_ref()
            .ok_or_else(|| IndexerError::invalid_config("node_url", "missing"))?;

        let mut cfg = IndexerConfig::builder().node_url(node_url.as_str());
        if let Some(ref db) = self.database_url {
            cfg = cfg.database_url(db);
        }
        if let Some(ref path) = self.state_path {
            cfg = cfg.state_path(path);
        }
        if let Some(block) = self.start_block {
            cfg = cfg.start_from_block(block);
        }
        if let Some(block) = self.end_block {
            cfg = cfg.end_at_block(block);
        }
        if let Some(interval) = self.block_interval {
            cfg = cfg.block_interval(interval);
        }
        if let Some(timeout) = self.chain_timeout {
            cfg = cfg.chain_timeout(timeout);
        }
        if let Some(timeout) = self.sink_timeout {
            cfg = cfg.sink_timeout(timeout);
        }
        cfg.build()
    }

    /// Connect to the node and build the indexer.
    pub async fn build(self) -> Result<Indexer<SubstrateChainClient<C>>, IndexerError> {
        let node_url = self
            .node_url
            .clone()
            .ok_or_else(|| IndexerError::invalid_config("node_url", "missing"))?;
        self.config()?;
        let chain = SubstrateChainClient::<C>::connect(&node_url).await?;
        self.build_with_chain(chain).await
    }

    /// Build the indexer around any [`ChainClient`].
    pub async fn build_with_chain<Ch: ChainClient>(
        self,
        chain: Ch,
    ) -> Result<Indexer<Ch>, IndexerError> {
        let config = self.config()?;
        let store = match self.store {
            Some(store) => store,
            None => init_store(config.database_url.as_deref(), config.state_path.clone()).await?,
        };

        let mut indexer = Indexer::new(chain, store, config);
        if let Some(filter) = self.filter {
            indexer.set_filter(filter);
        }
        if let Some(retry) = self.retry_config {
            indexer.set_retry_config(retry);
        }
        if let Some(ticker) = self.ticker {
            indexer.set_ticker(ticker);
        }
        for (name, handler) in self.sinks {
            indexer.add_dyn_sink(&name, handler)?;
        }

        Ok(indexer)
    }
}
