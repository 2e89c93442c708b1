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
use crate::handler::SinkHandler;
use crate::retry::with_timeout;
use crate::types::EventMeta;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Upper bound for a single best-effort delivery.
pub const DEFAULT_SIDE_CHANNEL_TIMEOUT: Duration = Duration::from_secs(30);

/// A sink assembled from several handlers.
///
/// Required handlers run in insertion order and the first error fails the
/// whole group. Best-effort handlers (chat alerts, webhooks) are spawned as
/// detached tasks once the required ones succeeded. They never delay the
/// group, their errors and timeouts are only logged, and the order in which
/// they observe events is not guaranteed.
pub struct HandlerGroup {
    required: Vec<Box<dyn SinkHandler>>,
    best_effort: Vec<(Arc<str>, Arc<dyn SinkHandler>)>,
    side_channel_timeout: Duration,
}

impl Default for HandlerGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerGroup {
    /// Create an empty handler group.
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            best_effort: Vec::new(),
            side_channel_timeout: DEFAULT_SIDE_CHANNEL_TIMEOUT,
        }
    }

    #[allow(clippy::should_implement_trait)]
    /// Add a required handler to the group.
    pub fn add(mut self, handler: impl SinkHandler + 'static) -> Self {
        self.required.push(Box::new(handler));
        self
    }

    /// Add a required handler that will only run when the predicate returns true.
    pub fn add_conditional<F>(mut self, handler: impl SinkHandler + 'static, pred: F) -> Self
    where
        F: Fn(&EventMeta) -> bool + Send + Sync + 'static,
    {
        self.required
            .push(Box::new(ConditionalHandler { handler, pred }));
        self
    }

    /// Add a side channel whose failures are only logged.
    pub fn add_best_effort(
        mut self,
        name: impl Into<String>,
        handler: impl SinkHandler + 'static,
    ) -> Self {
        self.best_effort
            .push((Arc::from(name.into()), Arc::new(handler)));
        self
    }

    /// Time a best-effort delivery may take before it is abandoned.
    pub fn side_channel_timeout(mut self, limit: Duration) -> Self {
        self.side_channel_timeout = limit;
        self
    }

    /// Shortcut for building simple pipelines.
    pub fn pipe_to(self, handler: impl SinkHandler + 'static) -> Self {
        self.add(handler)
    }

    pub fn len(&self) -> usize {
        self.required.len() + self.best_effort.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SinkHandler for HandlerGroup {
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        for h in &self.required {
            if let Err(e) = h.handle_event(event).await {
                h.handle_error(&e, event).await;
                return Err(e);
            }
        }

        for (name, h) in &self.best_effort {
            tokio::spawn(deliver_best_effort(
                name.clone(),
                h.clone(),
                event.clone(),
                self.side_channel_timeout,
            ));
        }
        Ok(())
    }
}

async fn deliver_best_effort(
    name: Arc<str>,
    handler: Arc<dyn SinkHandler>,
    event: EventMeta,
    limit: Duration,
) {
    let operation = format!("side channel {name}");
    if let Err(e) = with_timeout(&operation, limit, handler.handle_event(&event)).await {
        warn!(
            target: "indexer",
            channel = %name,
            block = event.block_number,
            index = event.event_index,
            "best-effort handler failed: {e}"
        );
    }
}

struct ConditionalHandler<H, F> {
    handler: H,
    pred: F,
}

#[async_trait]
impl<H, F> SinkHandler for ConditionalHandler<H, F>
where
    H: SinkHandler + 'static,
    F: Fn(&EventMeta) -> bool + Send + Sync + 'static,
{
    async fn handle_event(&self, event: &EventMeta) -> Result<(), IndexerError> {
        if (self.pred)(event) {
            self.handler.handle_event(event).await
        } else {
            Ok(())
        }
    }

    async fn handle_error(&self, error: &IndexerError, event: &EventMeta) {
        self.handler.handle_error(error, event).await;
    }
}
