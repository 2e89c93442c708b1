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
use std::path::PathBuf;
use tokio::fs;

/// The state document as a pretty-printed JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so readers never observe a half-written document.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Self { path }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl CheckpointStore for JsonStore {
    async fn read_state(&self) -> Result<OffchainState, IndexerError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(OffchainState::new());
        }
        let data = fs::read_to_string(&self.path)
            .await
            .map_err(|e| IndexerError::checkpoint("read_state", "json", e))?;
        if data.trim().is_empty() {
            return Ok(OffchainState::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    async fn write_state(&self, state: &OffchainState) -> Result<(), IndexerError> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| IndexerError::checkpoint("write_state", "json", e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| IndexerError::checkpoint("write_state", "json", e))?;
        Ok(())
    }
}
