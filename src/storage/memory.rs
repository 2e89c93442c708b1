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
use crate::storage::CheckpointStore;
use async_trait::async_trait;
use std::sync::Mutex;

/// Keeps the state in RAM. Everything is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<OffchainState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: OffchainState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> OffchainState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn read_state(&self) -> Result<OffchainState, IndexerError> {
        Ok(self.snapshot())
    }

    async fn write_state(&self, state: &OffchainState) -> Result<(), IndexerError> {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state.clone();
        Ok(())
    }
}
