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

//! Read access to the chain the indexer follows.

use crate::error::IndexerError;
use crate::types::{BlockNumber, ChainEvent};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;
use std::time::Duration;

pub mod head;
pub mod substrate;

pub use head::LatestHead;
pub use substrate::SubstrateChainClient;

/// Numbers of newly imported block headers, in arrival order.
pub type HeadStream = BoxStream<'static, Result<BlockNumber, IndexerError>>;

#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    type Hash: Clone + Debug + Send + Sync + 'static;

    async fn best_finalized_block_number(&self) -> Result<BlockNumber, IndexerError>;

    async fn block_hash(&self, block: BlockNumber) -> Result<Self::Hash, IndexerError>;

    /// Every event of the block, ordered by index.
    async fn events_at(&self, hash: &Self::Hash) -> Result<Vec<ChainEvent>, IndexerError>;

    async fn subscribe_new_heads(&self) -> Result<HeadStream, IndexerError>;

    /// `Timestamp.Now` of the block in unix milliseconds, `None` when the
    /// chain has no timestamp pallet.
    async fn block_timestamp(&self, hash: &Self::Hash) -> Result<Option<u64>, IndexerError> {
        let _ = hash;
        Ok(None)
    }

    /// Lower bound between two blocks, if the chain exposes one.
    fn minimum_block_period(&self) -> Option<Duration>;
}
