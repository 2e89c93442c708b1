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

use flamewire_offchain_indexer::prelude::{
    async_trait, EventMeta, HandlerGroup, IndexerBuilder, IndexerError, SinkHandler,
    SubstrateConfig,
};
use tracing::{error, info};

/// Stand-in for the relational-store writer.
struct RowWriter;

#[async_trait]
impl SinkHandler for RowWriter {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        info!(
            block = event.block_number,
            index = event.event_index,
            event = %event.event_name,
            fields = event.data.len(),
            "insert activity"
        );
        Ok(())
    }
}

/// Stand-in for the search-index writer.
struct SearchIndexer;

#[async_trait]
impl SinkHandler for SearchIndexer {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        if event.event_name.starts_with("Space") || event.event_name.starts_with("Post") {
            info!(
                block = event.block_number,
                event = %event.event_name,
                "index document"
            );
        }
        Ok(())
    }
}

/// Chat notification, allowed to fail.
struct ChatAlert;

#[async_trait]
impl SinkHandler for ChatAlert {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        Err(IndexerError::handler_failed(
            "chat",
            event.block_number,
            "bot endpoint not configured",
        ))
    }
}

async fn run() -> Result<(), IndexerError> {
    let mut indexer = IndexerBuilder::<SubstrateConfig>::from_env()?
        .add_sink(
            "postgres",
            HandlerGroup::new()
                .add(RowWriter)
                .add_best_effort("chat", ChatAlert),
        )
        .add_sink("elastic", SearchIndexer)
        .build()
        .await?;
    indexer.run().await
}

#[tokio::main]
async fn main() {
    // Init tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .with_level(true)
        .compact()
        .init();

    if let Err(e) = run().await {
        error!("Unexpected error during processing of chain events: {e}");
        std::process::exit(1);
    }
}
