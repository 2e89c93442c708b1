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

use crate::chain::HeadStream;
use crate::types::BlockNumber;
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Most recent head number seen on the new-heads subscription.
///
/// A single-slot snapshot: the watcher task replaces it, readers only look
/// at the current value.
#[derive(Clone, Debug)]
pub struct LatestHead {
    rx: watch::Receiver<Option<BlockNumber>>,
}

impl LatestHead {
    /// A snapshot that never receives a value.
    pub fn detached() -> Self {
        let (_tx, rx) = watch::channel(None);
        Self { rx }
    }

    /// Latest head, or `None` when nothing arrived yet or the subscription
    /// ended and the value can no longer be trusted.
    pub fn get(&self) -> Option<BlockNumber> {
        if self.rx.has_changed().is_err() {
            return None;
        }
        *self.rx.borrow()
    }
}

/// Drive `heads` in a background task, publishing each number into the
/// returned snapshot.
pub fn spawn_head_watcher(mut heads: HeadStream) -> (LatestHead, JoinHandle<()>) {
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(async move {
        while let Some(item) = heads.next().await {
            match item {
                Ok(number) => {
                    debug!(target: "indexer", head = number, "new head");
                    tx.send_replace(Some(number));
                }
                Err(e) => {
                    warn!(target: "indexer", "head subscription failed: {e}");
                    break;
                }
            }
        }
        warn!(target: "indexer", "head subscription ended");
    });
    (LatestHead { rx }, handle)
}
