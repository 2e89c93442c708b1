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

use crate::error::IndexerError;
use crate::types::BlockNumber;
use crate::validated_types::{DatabaseUrl, WebSocketUrl};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_NODE_URL: &str = "SUBSTRATE_URL";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_STATE_PATH: &str = "OFFCHAIN_STATE_PATH";
pub const ENV_START_BLOCK: &str = "START_BLOCK";

/// Used when the chain does not expose `Timestamp.MinimumPeriod`.
pub const DEFAULT_MINIMUM_PERIOD: Duration = Duration::from_secs(3);
pub const DEFAULT_CHAIN_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the [`Indexer`](crate::indexer::Indexer).
#[derive(Clone, Debug)]
pub struct IndexerConfig {
    pub node_url: String,
    pub database_url: Option<String>,
    /// JSON state file used when no database URL is set.
    pub state_path: Option<PathBuf>,
    /// First block for sinks that have no stored checkpoint.
    pub start_block: Option<BlockNumber>,
    /// Stop once every healthy sink processed this block.
    pub end_block: Option<BlockNumber>,
    /// Overrides the finality polling interval derived from the chain.
    pub block_interval: Option<Duration>,
    pub chain_timeout: Duration,
    pub sink_timeout: Duration,
}

impl IndexerConfig {
    /// Create a new [`IndexerConfigBuilder`].
    pub fn builder() -> IndexerConfigBuilder {
        IndexerConfigBuilder::new()
    }

    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, IndexerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let node_url = lookup(ENV_NODE_URL)
            .ok_or_else(|| IndexerError::invalid_config("node_url", "SUBSTRATE_URL is not set"))?;
        let mut builder = Self::builder().node_url(node_url);
        if let Some(db) = lookup(ENV_DATABASE_URL) {
            builder = builder.database_url(db);
        }
        if let Some(path) = lookup(ENV_STATE_PATH) {
            builder = builder.state_path(path);
        }
        if let Some(start) = lookup(ENV_START_BLOCK) {
            let start = start.trim().parse::<BlockNumber>().map_err(|_| {
                IndexerError::invalid_config("start_block", "START_BLOCK must be a block number")
            })?;
            builder = builder.start_from_block(start);
        }
        builder.build()
    }

    /// Validate this configuration.
    pub fn validate(&self) -> Result<(), IndexerError> {
        if self.node_url.trim().is_empty() {
            return Err(IndexerError::invalid_config("node_url", "cannot be empty"));
        }
        WebSocketUrl::parse(&self.node_url)?;

        if let Some(db) = &self.database_url {
            DatabaseUrl::parse(db)?;
        }

        if let (Some(start), Some(end)) = (self.start_block, self.end_block) {
            if end < start {
                return Err(IndexerError::invalid_config(
                    "end_block",
                    "must be greater than or equal to start_block",
                ));
            }
        }

        if self.block_interval == Some(Duration::ZERO) {
            return Err(IndexerError::invalid_config(
                "block_interval",
                "must be greater than zero",
            ));
        }
        if self.chain_timeout.is_zero() {
            return Err(IndexerError::invalid_config(
                "chain_timeout",
                "must be greater than zero",
            ));
        }
        if self.sink_timeout.is_zero() {
            return Err(IndexerError::invalid_config(
                "sink_timeout",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Checkpoint given to a sink seen for the first time.
    pub fn initial_block(&self) -> BlockNumber {
        self.start_block.map_or(0, |b| b.saturating_sub(1))
    }

    /// Sleep between finality checks: the chain's minimum block period
    /// doubled, unless overridden.
    pub fn block_interval(&self, minimum_period: Option<Duration>) -> Duration {
        self.block_interval
            .unwrap_or_else(|| minimum_period.unwrap_or(DEFAULT_MINIMUM_PERIOD) * 2)
    }
}

/// Builder pattern for [`IndexerConfig`].
pub struct IndexerConfigBuilder {
    config: IndexerConfig,
}

impl Default for IndexerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: IndexerConfig {
                node_url: String::new(),
                database_url: None,
                state_path: None,
                start_block: None,
                end_block: None,
                block_interval: None,
                chain_timeout: DEFAULT_CHAIN_TIMEOUT,
                sink_timeout: DEFAULT_SINK_TIMEOUT,
            },
        }
    }

    /// Set the node URL.
    pub fn node_url(mut self, url: impl Into<String>) -> Self {
        self.config.node_url = url.into();
        self
    }

    /// Store the offchain state in a database (`postgres://` or `sqlite://`).
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Configure a PostgreSQL backend.
    pub fn with_postgres(self, url: impl Into<String>) -> Self {
        self.database_url(url)
    }

    /// Configure a SQLite backend.
    pub fn with_sqlite(self, url: impl Into<String>) -> Self {
        self.database_url(url)
    }

    pub fn state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.state_path = Some(path.into());
        self
    }

    /// Start indexing from the specified block.
    pub fn start_from_block(mut self, block: BlockNumber) -> Self {
        self.config.start_block = Some(block);
        self
    }

    /// End indexing at the specified block.
    pub fn end_at_block(mut self, block: BlockNumber) -> Self {
        self.config.end_block = Some(block);
        self
    }

    pub fn block_interval(mut self, interval: Duration) -> Self {
        self.config.block_interval = Some(interval);
        self
    }

    pub fn chain_timeout(mut self, timeout: Duration) -> Self {
        self.config.chain_timeout = timeout;
        self
    }

    pub fn sink_timeout(mut self, timeout: Duration) -> Self {
        self.config.sink_timeout = timeout;
        self
    }

    /// Build the configuration and validate it.
    pub fn build(self) -> Result<IndexerConfig, IndexerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
