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

use crate::chain::{ChainClient, HeadStream};
use crate::error::IndexerError;
use crate::types::{BlockNumber, ChainEvent};
use crate::validated_types::WebSocketUrl;
use async_trait::async_trait;
use futures::StreamExt;
use parity_scale_codec::Decode;
use std::time::Duration;
use subxt::backend::BackendExt;
use subxt::config::{HashFor, Header};
use subxt::events::Events;
use subxt::{
    backend::{legacy::LegacyRpcMethods, rpc::RpcClient},
    client::RuntimeVersion,
    Config, OnlineClient,
};
use tracing::{debug, info};

/// [`ChainClient`] over a Substrate node's websocket RPC.
pub struct SubstrateChainClient<C: Config> {
    url: String,
    client: OnlineClient<C>,
    rpc: LegacyRpcMethods<C>,
}

impl<C> SubstrateChainClient<C>
where
    C: Config + Send + Sync + 'static,
{
    pub async fn connect(url: &WebSocketUrl) -> Result<Self, IndexerError> {
        let connection_failed = |source: subxt::Error| IndexerError::ConnectionFailed {
            url: url.to_string(),
            source: Box::new(source),
        };
        let rpc_client = RpcClient::from_insecure_url(url.as_str())
            .await
            .map_err(|e| connection_failed(subxt::Error::from(e)))?;
        let client = OnlineClient::<C>::from_rpc_client(rpc_client.clone())
            .await
            .map_err(connection_failed)?;
        info!(
            target: "indexer",
            url = %url,
            spec_version = client.runtime_version().spec_version,
            "connected to chain"
        );
        Ok(Self {
            url: url.to_string(),
            client,
            rpc: LegacyRpcMethods::<C>::new(rpc_client),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn client(&self) -> &OnlineClient<C> {
        &self.client
    }

    /// Swap in the metadata of the runtime that produced `hash` when it
    /// differs from the one the client currently decodes with.
    async fn update_metadata(&self, hash: HashFor<C>) -> Result<(), IndexerError> {
        let version = self
            .rpc
            .state_get_runtime_version(Some(hash))
            .await
            .map_err(|e| IndexerError::MetadataUpdateFailed {
                source: Box::new(subxt::Error::from(e)),
            })?;

        let current = self.client.runtime_version();
        if version.spec_version == current.spec_version {
            return Ok(());
        }

        use subxt::metadata::types::SUPPORTED_METADATA_VERSIONS;
        let backend = self.client.backend();
        let mut metadata = None;
        for v in SUPPORTED_METADATA_VERSIONS {
            if let Ok(m) = backend.metadata_at_version(v, hash).await {
                metadata = Some(m);
                break;
            }
        }
        let metadata = match metadata {
            Some(m) => m,
            None => backend
                .legacy_metadata(hash)
                .await
                .map_err(|e| IndexerError::MetadataUpdateFailed {
                    source: Box::new(e),
                })?,
        };
        debug!(
            target: "indexer",
            from = current.spec_version,
            to = version.spec_version,
            "runtime upgrade, metadata replaced"
        );
        self.client.set_metadata(metadata);
        self.client.set_runtime_version(RuntimeVersion {
            spec_version: version.spec_version,
            transaction_version: version.transaction_version,
        });
        Ok(())
    }
}

/// Decode every event of a block into [`ChainEvent`]s ordered by index.
pub fn decode_events<C: Config>(
    events: &Events<C>,
    block: BlockNumber,
) -> Result<Vec<ChainEvent>, IndexerError> {
    let mut decoded = Vec::with_capacity(events.len() as usize);
    for (position, evt) in events.iter().enumerate() {
        let evt = evt.map_err(|e| IndexerError::EventDecodingFailed {
            index: position as u32,
            block,
            source: Box::new(e),
        })?;
        let fields = evt
            .field_values()
            .map_err(|e| IndexerError::EventDecodingFailed {
                index: evt.index(),
                block,
                source: Box::new(e),
            })?;
        decoded.push(ChainEvent::new(
            evt.pallet_name(),
            evt.variant_name(),
            fields.into_values().collect(),
            evt.index(),
        ));
    }
    decoded.sort_by_key(|e| e.index);
    Ok(decoded)
}

#[async_trait]
impl<C> ChainClient for SubstrateChainClient<C>
where
    C: Config + Send + Sync + 'static,
{
    type Hash = HashFor<C>;

    async fn best_finalized_block_number(&self) -> Result<BlockNumber, IndexerError> {
        let finalized_hash = self
            .rpc
            .chain_get_finalized_head()
            .await
            .map_err(|e| IndexerError::from(subxt::Error::from(e)))?;
        let header = self
            .rpc
            .chain_get_header(Some(finalized_hash))
            .await
            .map_err(|e| IndexerError::from(subxt::Error::from(e)))?
            .ok_or(IndexerError::BlockNotFound { block: 0 })?;
        let number: BlockNumber = header.number().into();
        Ok(number)
    }

    async fn block_hash(&self, block: BlockNumber) -> Result<Self::Hash, IndexerError> {
        self.rpc
            .chain_get_block_hash(Some(block.into()))
            .await
            .map_err(|e| IndexerError::from(subxt::Error::from(e)))?
            .ok_or(IndexerError::BlockNotFound { block })
    }

    async fn events_at(&self, hash: &Self::Hash) -> Result<Vec<ChainEvent>, IndexerError> {
        self.update_metadata(*hash).await?;
        let block = self.client.blocks().at(*hash).await?;
        let number: BlockNumber = block.number().into();
        let events = block.events().await?;
        decode_events(&events, number)
    }

    async fn subscribe_new_heads(&self) -> Result<HeadStream, IndexerError> {
        let sub = self
            .rpc
            .chain_subscribe_new_heads()
            .await
            .map_err(|e| IndexerError::from(subxt::Error::from(e)))?;
        Ok(sub
            .map(|res| {
                res.map(|header: C::Header| -> BlockNumber { header.number().into() })
                    .map_err(|e| IndexerError::Subscription {
                        message: e.to_string(),
                    })
            })
            .boxed())
    }

    async fn block_timestamp(&self, hash: &Self::Hash) -> Result<Option<u64>, IndexerError> {
        if self.client.metadata().pallet_by_name("Timestamp").is_none() {
            return Ok(None);
        }
        let address = subxt::dynamic::storage("Timestamp", "Now", ());
        let Some(now) = self.client.storage().at(*hash).fetch(&address).await? else {
            return Ok(None);
        };
        let millis = now.to_value().map_err(subxt::Error::from)?.as_u128().and_then(|ms| u64::try_from(ms).ok());
        Ok(millis)
    }

    fn minimum_block_period(&self) -> Option<Duration> {
        let metadata = self.client.metadata();
        let constant = metadata
            .pallet_by_name("Timestamp")?
            .constant_by_name("MinimumPeriod")?;
        let mut bytes = constant.value();
        let millis = u64::decode(&mut bytes).ok()?;
        Some(Duration::from_millis(millis))
    }
}
