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
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

fn parse_url(input: &str, field: &str, schemes: &[&str]) -> Result<Url, IndexerError> {
    let url =
        Url::parse(input.trim()).map_err(|_| IndexerError::invalid_config(field, "invalid URL"))?;
    if schemes.contains(&url.scheme()) {
        return Ok(url);
    }
    let expected: Vec<String> = schemes.iter().map(|s| format!("{s}://")).collect();
    Err(IndexerError::invalid_config(
        field,
        format!("must start with {}", expected.join(" or ")),
    ))
}

/// Chain RPC endpoint, `ws://` or `wss://`.
#[derive(Clone, Debug)]
pub struct WebSocketUrl(Url);

impl WebSocketUrl {
    pub fn parse(input: &str) -> Result<Self, IndexerError> {
        parse_url(input, "node_url", &["ws", "wss"]).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for WebSocketUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WebSocketUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug)]
pub struct PostgresUrl(Url);

impl PostgresUrl {
    pub fn parse(input: &str) -> Result<Self, IndexerError> {
        parse_url(input, "database_url", &["postgres", "postgresql"]).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostgresUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// `sqlite://<path>`; the path may be `:memory:`.
#[derive(Clone, Debug)]
pub struct SqliteUrl(PathBuf);

impl SqliteUrl {
    pub fn parse(input: &str) -> Result<Self, IndexerError> {
        let Some(path) = input.strip_prefix("sqlite://") else {
            return Err(IndexerError::invalid_config(
                "database_url",
                "must start with sqlite://",
            ));
        };
        if path.is_empty() {
            return Err(IndexerError::invalid_config(
                "database_url",
                "sqlite path cannot be empty",
            ));
        }
        Ok(Self(PathBuf::from(path)))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SqliteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqlite://{}", self.0.display())
    }
}

/// Where the offchain state lives when it is not a JSON file.
#[derive(Clone, Debug)]
pub enum DatabaseUrl {
    Postgres(PostgresUrl),
    Sqlite(SqliteUrl),
}

impl DatabaseUrl {
    pub fn parse(input: &str) -> Result<Self, IndexerError> {
        if input.trim().is_empty() {
            return Err(IndexerError::invalid_config(
                "database_url",
                "cannot be empty",
            ));
        }
        if input.starts_with("sqlite://") {
            SqliteUrl::parse(input).map(Self::Sqlite)
        } else {
            PostgresUrl::parse(input).map(Self::Postgres)
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres(url) => url.fmt(f),
            Self::Sqlite(url) => url.fmt(f),
        }
    }
}

/// Key of a sink inside the offchain state document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkName(String);

impl SinkName {
    pub fn parse(input: &str) -> Result<Self, IndexerError> {
        let name = input.trim();
        if name.is_empty() {
            return Err(IndexerError::invalid_config("sink", "name cannot be empty"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IndexerError::invalid_config(
                "sink",
                format!("`{name}` may only contain letters, digits, `_` and `-`"),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SinkName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SinkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
