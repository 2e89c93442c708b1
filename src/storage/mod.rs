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

use crate::checkpoint::OffchainState;
use crate::error::IndexerError;
use crate::types::BlockNumber;
use async_trait::async_trait;

pub mod init;
#[cfg(feature = "json-storage")]
pub mod json;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Durable home of the [`OffchainState`] document.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the whole document. A store that was never written returns an
    /// empty state.
    async fn read_state(&self) -> Result<OffchainState, IndexerError>;

    /// Replace the whole document in a single atomic write.
    async fn write_state(&self, state: &OffchainState) -> Result<(), IndexerError>;
}

/// Block number as stored in a signed `BIGINT` column.
pub fn block_to_column(block: BlockNumber, backend: &str) -> Result<i64, IndexerError> {
    i64::try_from(block).map_err(|e| IndexerError::checkpoint("write_state", backend, e))
}

/// Block number read back from a signed `BIGINT` column.
pub fn block_from_column(raw: i64, backend: &str) -> Result<BlockNumber, IndexerError> {
    BlockNumber::try_from(raw).map_err(|e| IndexerError::checkpoint("read_state", backend, e))
}
