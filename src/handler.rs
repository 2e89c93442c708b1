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
use crate::types::EventMeta;
use async_trait::async_trait;
use std::sync::Arc;

/// A downstream consumer of filtered chain events.
///
/// Calls arrive in ascending `event_index` order within a block. After a
/// failure the failing block is not credited, so on restart every event of
/// that block is delivered again and implementations must tolerate seeing the
/// same `(block_number, event_index)` more than once.
#[allow(unused_variables)]
#[async_trait]
pub trait SinkHandler: Send + Sync {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError>;

    /// Called with the error before the sink is taken out of rotation.
    async fn handle_error(&self, error: &IndexerError, event: &EventMeta) {}
}

#[async_trait]
impl<H: SinkHandler + ?Sized> SinkHandler for Arc<H> {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        (**self).handle_event(event).await
    }

    async fn handle_error(&self, error: &IndexerError, event: &EventMeta) {
        (**self).handle_error(error, event).await
    }
}

#[async_trait]
impl<H: SinkHandler + ?Sized> SinkHandler for Box<H> {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        (**self).handle_event(event).await
    }

    async fn handle_error(&self, error: &IndexerError, event: &EventMeta) {
        (**self).handle_error(error, event).await
    }
}
