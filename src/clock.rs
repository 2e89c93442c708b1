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

use async_trait::async_trait;
use std::time::Duration;

/// Source of the polling delay used while waiting for finality.
#[async_trait]
pub trait Ticker: Send + Sync {
    async fn tick(&self, period: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn tick(&self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}
