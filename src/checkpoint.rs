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

//! Persisted per-sink progress.
//!
//! The whole [`OffchainState`] is one JSON document keyed by sink name:
//!
//! ```json
//! { "postgres": { "lastProcessedBlock": 10, "lastError": "boom" },
//!   "elastic":  { "lastProcessedBlock": 11 } }
//! ```

use crate::types::BlockNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkCheckpoint {
    pub last_processed_block: BlockNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SinkCheckpoint {
    pub fn at(last_processed_block: BlockNumber) -> Self {
        Self {
            last_processed_block,
            last_error: None,
        }
    }

    pub fn failed(last_processed_block: BlockNumber, error: impl Into<String>) -> Self {
        Self {
            last_processed_block,
            last_error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffchainState {
    sinks: BTreeMap<String, SinkCheckpoint>,
}

impl OffchainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sink: &str) -> Option<&SinkCheckpoint> {
        self.sinks.get(sink)
    }

    pub fn set(&mut self, sink: impl Into<String>, checkpoint: SinkCheckpoint) {
        self.sinks.insert(sink.into(), checkpoint);
    }

    pub fn with(mut self, sink: impl Into<String>, checkpoint: SinkCheckpoint) -> Self {
        self.set(sink, checkpoint);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SinkCheckpoint)> {
        self.sinks.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Drop every recorded error, keeping block numbers. Done once at startup
    /// so previously faulted sinks retry their failing block.
    pub fn clear_errors(&mut self) -> Vec<String> {
        let mut cleared = Vec::new();
        for (name, checkpoint) in self.sinks.iter_mut() {
            if checkpoint.last_error.take().is_some() {
                cleared.push(name.clone());
            }
        }
        cleared
    }
}

