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

#[cfg(feature = "json-storage")]
use crate::storage::json::JsonStore;
#[cfg(feature = "postgres")]
use crate::storage::postgres::PostgreSQLStore;
#[cfg(feature = "sqlite")]
use crate::storage::sqlite::SQLiteStore;
use crate::error::IndexerError;
use crate::storage::CheckpointStore;
use crate::validated_types::{DatabaseUrl, PostgresUrl, SqliteUrl};
use std::path::PathBuf;
use tracing::info;

/// Default location of the JSON state document.
pub const DEFAULT_STATE_PATH: &str = "database/offchain-state.json";

type BoxedStore = Box<dyn CheckpointStore>;

/// Open the store named by `database_url`, or the JSON document at
/// `state_path` (default [`DEFAULT_STATE_PATH`]) when no URL is set.
pub async fn init_store(
    database_url: Option<&str>,
    state_path: Option<PathBuf>,
) -> Result<BoxedStore, IndexerError> {
    match database_url.map(DatabaseUrl::parse).transpose()? {
        Some(DatabaseUrl::Postgres(url)) => postgres_store(&url).await,
        Some(DatabaseUrl::Sqlite(url)) => sqlite_store(&url).await,
        None => json_store(state_path.unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH))).await,
    }
}

#[cfg(feature = "postgres")]
async fn postgres_store(url: &PostgresUrl) -> Result<BoxedStore, IndexerError> {
    info!(target: "indexer", "offchain state in postgres");
    Ok(Box::new(PostgreSQLStore::new(url.as_str()).await?))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_store(_url: &PostgresUrl) -> Result<BoxedStore, IndexerError> {
    Err(IndexerError::invalid_config(
        "database_url",
        "postgres feature disabled",
    ))
}

#[cfg(feature = "sqlite")]
async fn sqlite_store(url: &SqliteUrl) -> Result<BoxedStore, IndexerError> {
    info!(target: "indexer", path = %url.as_path().display(), "offchain state in sqlite");
    let path = url.as_path().to_string_lossy();
    Ok(Box::new(SQLiteStore::new(&path).await?))
}

#[cfg(not(feature = "sqlite"))]
async fn sqlite_store(_url: &SqliteUrl) -> Result<BoxedStore, IndexerError> {
    Err(IndexerError::invalid_config(
        "database_url",
        "sqlite feature disabled",
    ))
}

#[cfg(feature = "json-storage")]
async fn json_store(path: PathBuf) -> Result<BoxedStore, IndexerError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }
    info!(target: "indexer", path = %path.display(), "offchain state in json file");
    Ok(Box::new(JsonStore::new(path)))
}

#[cfg(not(feature = "json-storage"))]
async fn json_store(_path: PathBuf) -> Result<BoxedStore, IndexerError> {
    Err(IndexerError::invalid_config(
        "storage",
        "no storage backend enabled",
    ))
}
