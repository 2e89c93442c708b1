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

//! Picks the next block and the sinks that take part in it.

use crate::checkpoint::SinkCheckpoint;
use crate::types::BlockNumber;

/// Runtime health of a sink. Moves from `Active` to `Faulted` at most once
/// per process; only a restart brings a sink back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkStatus {
    Active,
    Faulted { error: String },
}

/// In-memory progress of one sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkCursor {
    last_processed_block: BlockNumber,
    status: SinkStatus,
}

impl SinkCursor {
    pub fn active(last_processed_block: BlockNumber) -> Self {
        Self {
            last_processed_block,
            status: SinkStatus::Active,
        }
    }

    /// Cursor for a freshly started process: any stored error is forgotten,
    /// the block number is kept so the failing block gets fetched again.
    pub fn resume(checkpoint: &SinkCheckpoint) -> Self {
        Self::active(checkpoint.last_processed_block)
    }

    /// Cursor that mirrors the checkpoint exactly, error included.
    pub fn restore(checkpoint: &SinkCheckpoint) -> Self {
        match &checkpoint.last_error {
            Some(error) => Self {
                last_processed_block: checkpoint.last_processed_block,
                status: SinkStatus::Faulted {
                    error: error.clone(),
                },
            },
            None => Self::active(checkpoint.last_processed_block),
        }
    }

    pub fn last_processed_block(&self) -> BlockNumber {
        self.last_processed_block
    }

    pub fn status(&self) -> &SinkStatus {
        &self.status
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self.status, SinkStatus::Faulted { .. })
    }

    /// Credit `block` as fully processed. Ignored for faulted sinks and for
    /// blocks that would move the cursor backwards.
    pub fn advance(&mut self, block: BlockNumber) -> bool {
        if self.is_faulted() || block < self.last_processed_block {
            return false;
        }
        self.last_processed_block = block;
        true
    }

    /// Record a failure while processing `block`. The block is not credited.
    pub fn fault(&mut self, block: BlockNumber, error: impl Into<String>) {
        if self.is_faulted() {
            return;
        }
        self.last_processed_block = block.saturating_sub(1);
        self.status = SinkStatus::Faulted {
            error: error.into(),
        };
    }

    pub fn checkpoint(&self) -> SinkCheckpoint {
        match &self.status {
            SinkStatus::Active => SinkCheckpoint::at(self.last_processed_block),
            SinkStatus::Faulted { error } => {
                SinkCheckpoint::failed(self.last_processed_block, error.clone())
            }
        }
    }
}

/// Block to fetch next and, per sink (same order as the input), whether the
/// sink receives its events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPlan {
    pub block: BlockNumber,
    pub active: Vec<bool>,
}

impl BlockPlan {
    pub fn is_active(&self, sink: usize) -> bool {
        self.active.get(sink).copied().unwrap_or(false)
    }

    pub fn participants(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, active)| active.then_some(i))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    Fetch(BlockPlan),
    /// Every sink is faulted, there is nothing left to do.
    Halt,
}

/// The slowest healthy sink drives the next block. Sinks already past it sit
/// the iteration out so they never see a block twice; faulted sinks are
/// ignored entirely.
pub fn reconcile(cursors: &[SinkCursor]) -> Reconciliation {
    let Some(min) = cursors
        .iter()
        .filter(|c| !c.is_faulted())
        .map(SinkCursor::last_processed_block)
        .min()
    else {
        return Reconciliation::Halt;
    };

    Reconciliation::Fetch(BlockPlan {
        block: min + 1,
        active: cursors
            .iter()
            .map(|c| !c.is_faulted() && c.last_processed_block == min)
            .collect(),
    })
}
