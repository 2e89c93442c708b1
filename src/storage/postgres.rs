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
use sqlx::{postgres::PgPoolOptions, PgPool};

fn pg_error(operation: &'static str) -> impl Fn(sqlx::Error) -> IndexerError {
    move |e| IndexerError::checkpoint(operation, "postgres", e)
}

/// One row per sink; a state write replaces all rows inside one transaction.
pub struct PostgreSQLStore {
    pool: PgPool,
}

impl PostgreSQLStore {
    pub async fn new(database_url: &str) -> Result<Self, IndexerError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(pg_error("connect"))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS offchain_state (
                sink TEXT PRIMARY KEY,
                last_processed_block BIGINT NOT NULL,
                last_error TEXT
            )",
        )
        .execute(&pool)
        .await
        .map_err(pg_error("init"))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CheckpointStore for PostgreSQLStore {
    async fn read_state(&self) -> Result<OffchainState, IndexerError> {
        let rows: Vec<(String, i64, Option<String>)> = sqlx::query_as(
            "SELECT sink, last_processed_block, last_error FROM offchain_state",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(pg_error("read_state"))?;

        let mut state = OffchainState::new();
        for (sink, block, last_error) in rows {
            state.set(
                sink,
                SinkCheckpoint {
                    last_processed_block: block_from_column(block, "postgres")?,
                    last_error,
                },
            );
        }
        Ok(state)
    }

    async fn write_state(&self, state: &OffchainState) -> Result<(), IndexerError> {
        let mut tx = self.pool.begin().await.map_err(pg_error("write_state"))?;
        for (sink, checkpoint) in state.iter() {
            sqlx::query(
                "INSERT INTO offchain_state (sink, last_processed_block, last_error)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (sink) DO UPDATE SET
                    last_processed_block = EXCLUDED.last_processed_block,
                    last_error = EXCLUDED.last_error",
            )
            .bind(sink)
            .bind(block_to_column(checkpoint.last_processed_block, "postgres")?)
            .bind(checkpoint.last_error.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(pg_error("write_state"))?;
        }
        tx.commit().await.map_err(pg_error("write_state"))?;
        Ok(())
    }
}
