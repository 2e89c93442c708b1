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

use scale_value::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub type BlockNumber = u64;

/// Event field values in declaration order.
pub type EventData = Vec<Value<u32>>;

/// A decoded event as it appears in a block, before filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainEvent {
    pub pallet_name: String,
    pub method_name: String,
    pub data: EventData,
    /// Position of the event within its block.
    pub index: u32,
}

impl ChainEvent {
    pub fn new(
        pallet_name: impl Into<String>,
        method_name: impl Into<String>,
        data: EventData,
        index: u32,
    ) -> Self {
        Self {
            pallet_name: pallet_name.into(),
            method_name: method_name.into(),
            data,
            index,
        }
    }

    pub fn pallet_name(&self) -> &str {
        &self.pallet_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }
}

/// What every sink receives for a filtered event. Built once per event and
/// shared by reference between the sinks that take part in the block.
#[derive(Clone, Debug, PartialEq)]
pub struct EventMeta {
    pub event_name: String,
    pub pallet_name: String,
    pub data: EventData,
    pub block_number: BlockNumber,
    pub event_index: u32,
    /// Unix milliseconds of the block, when the chain records one.
    pub timestamp: Option<u64>,
}

impl EventMeta {
    pub fn from_event(event: ChainEvent, block_number: BlockNumber) -> Self {
        Self {
            event_name: event.method_name,
            pallet_name: event.pallet_name,
            data: event.data,
            block_number,
            event_index: event.index,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Option<u64>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Wall-clock time of the block the event was emitted in.
    pub fn time(&self) -> Option<SystemTime> {
        self.timestamp.map(|ms| UNIX_EPOCH + Duration::from_millis(ms))
    }

    /// Field at `position`, if the event carries that many values.
    pub fn field(&self, position: usize) -> Option<&Value<u32>> {
        self.data.get(position)
    }
}
