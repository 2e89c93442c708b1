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

pub use crate::builder::IndexerBuilder;
pub use crate::chain::{ChainClient, SubstrateChainClient};
pub use crate::checkpoint::{OffchainState, SinkCheckpoint};
pub use crate::config::IndexerConfig;
pub use crate::error::IndexerError;
pub use crate::filter::EventFilter;
pub use crate::handler::SinkHandler;
pub use crate::handler_group::HandlerGroup;
pub use crate::indexer::Indexer;
pub use crate::storage::CheckpointStore;
pub use crate::types::{BlockNumber, ChainEvent, EventMeta};
pub use crate::validated_types::WebSocketUrl;

pub use async_trait::async_trait;
pub use parity_scale_codec::Decode;
pub use scale_decode::DecodeAsType;
pub use scale_value::{Composite, Value, ValueDef};
pub use subxt::{config::substrate::SubstrateConfig, utils::AccountId32};

pub use parity_scale_codec;
pub use scale_decode;
