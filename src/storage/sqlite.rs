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

use crate::checkpoint::{OffchainState, SinkCheckpoint};
use crate::error::IndexerError;
use crate::storage::{block_from_column, block_to_column, CheckpointStore};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

fn sqlite_error(operation: &'static str) -> impl Fn(sqlx::Error) -> IndexerError {
    move |e| IndexerError::checkpoint(operation, "sqlite", e)
}

/// One row per sink; a state write replaces all rows inside one transaction.
pub struct SQLiteStore {
    pool: SqlitePool,
}

impl SQLiteStore {
    /// `path` is a file path or `sqlite::memory:`.
    pub async fn new(path: &str) -> Result<Self, IndexerError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite://{path}")
        };
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(sqlite_error("connect"))?
            .create_if_missing(true);
        // A single connection keeps `:memory:` databases shared.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(sqlite_error("connect"))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS offchain_state (
                sink TEXT PRIMARY KEY,
                last_processed_block BIGINT NOT NULL,
                last_error TEXT
            )",
        )
        .execute(&pool)
        .await
        .map_err(sqlite_error("init"))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CheckpointStore for SQLiteStore {
    async fn read_state(&self) -> Result<OffchainState, IndexerError> {
        let rows: Vec<(String, i64, Option<String>)> = sqlx::query_as(
            "SELECT sink, last_processed_block, last_error FROM offchain_state",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(sqlite_error("read_state"))?;

        let mut state = OffchainState::new();
        for (sink, block, last_error) in rows {
            state.set(
                sink,
                SinkCheckpoint {
                    last_processed_block: block_from_column(block, "sqlite")?,
                    last_error,
                },
            );
        }
        Ok(state)
    }

    async fn write_state(&self, state: &OffchainState) -> Result<(), IndexerError> {
        let mut tx = self.pool.begin().await.map_err(sqlite_error("write_state"))?;
        for (sink, checkpoint) in state.iter() {
            sqlx::query(
                "INSERT INTO offchain_state (sink, last_processed_block, last_error)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (sink) DO UPDATE SET
                    last_processed_block = EXCLUDED.last_processed_block,
                    last_error = EXCLUDED.last_error",
            )
            .bind(sink)
            .bind(block_to_column(checkpoint.last_processed_block, "sqlite")?)
            .bind(checkpoint.last_error.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(sqlite_error("write_state"))?;
        }
        tx.commit().await.map_err(sqlite_error("write_state"))?;
        Ok(())
    }
}
