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

use flamewire_offchain_indexer::config::{
    IndexerConfig, DEFAULT_CHAIN_TIMEOUT, DEFAULT_MINIMUM_PERIOD, DEFAULT_SINK_TIMEOUT,
};
use flamewire_offchain_indexer::{IndexerError, SinkName};
use std::collections::HashMap;
use std::time::Duration;

fn field_of(err: IndexerError) -> String {
    match err {
        IndexerError::InvalidConfig { field, .. } => field,
        _ => panic!("wrong error: {err:?}"),
    }
}

#[test]
fn builder_valid() {
    let cfg = IndexerConfig::builder()
        .node_url("wss://node")
        .with_sqlite("sqlite://offchain.db")
        .start_from_block(10)
        .end_at_block(20)
        .build()
        .expect("should build");
    assert_eq!(cfg.node_url, "wss://node");
    assert_eq!(cfg.database_url.as_deref(), Some("sqlite://offchain.db"));
    assert_eq!(cfg.start_block, Some(10));
    assert_eq!(cfg.end_block, Some(20));
    assert_eq!(cfg.chain_timeout, DEFAULT_CHAIN_TIMEOUT);
    assert_eq!(cfg.sink_timeout, DEFAULT_SINK_TIMEOUT);
}

#[test]
fn builder_empty_node_url() {
    let err = IndexerConfig::builder().node_url("").build().unwrap_err();
    assert_eq!(field_of(err), "node_url");
}

#[test]
fn builder_wrong_format() {
    let err = IndexerConfig::builder()
        .node_url("http://localhost")
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("must start"));
}

#[test]
fn builder_empty_db_url() {
    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .with_postgres("")
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "database_url");
}

#[test]
fn builder_bad_db_scheme() {
    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .database_url("mysql://db")
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "database_url");

    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .with_sqlite("sqlite://")
        .build()
        .unwrap_err();
    assert!(format!("{err}").contains("sqlite path cannot be empty"));
}

#[test]
fn builder_end_before_start() {
    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .start_from_block(10)
        .end_at_block(5)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "end_block");
}

#[test]
fn builder_zero_durations() {
    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .block_interval(Duration::ZERO)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "block_interval");

    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .sink_timeout(Duration::ZERO)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "sink_timeout");

    let err = IndexerConfig::builder()
        .node_url("ws://node")
        .chain_timeout(Duration::ZERO)
        .build()
        .unwrap_err();
    assert_eq!(field_of(err), "chain_timeout");
}

#[test]
fn initial_block_precedes_start_block() {
    let cfg = IndexerConfig::builder().node_url("ws://node").build().unwrap();
    assert_eq!(cfg.initial_block(), 0);

    let cfg = IndexerConfig::builder()
        .node_url("ws://node")
        .start_from_block(100)
        .build()
        .unwrap();
    assert_eq!(cfg.initial_block(), 99);

    let cfg = IndexerConfig::builder()
        .node_url("ws://node")
        .start_from_block(0)
        .build()
        .unwrap();
    assert_eq!(cfg.initial_block(), 0);
}

#[test]
fn block_interval_doubles_minimum_period() {
    let cfg = IndexerConfig::builder().node_url("ws://node").build().unwrap();
    assert_eq!(
        cfg.block_interval(Some(Duration::from_secs(6))),
        Duration::from_secs(12)
    );
    assert_eq!(cfg.block_interval(None), DEFAULT_MINIMUM_PERIOD * 2);

    let cfg = IndexerConfig::builder()
        .node_url("ws://node")
        .block_interval(Duration::from_millis(250))
        .build()
        .unwrap();
    assert_eq!(
        cfg.block_interval(Some(Duration::from_secs(6))),
        Duration::from_millis(250)
    );
}

#[test]
fn from_lookup_reads_variables() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SUBSTRATE_URL", "wss://rpc.example"),
        ("DATABASE_URL", "postgres://user@localhost/db"),
        ("START_BLOCK", "42"),
    ]);
    let cfg = IndexerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(cfg.node_url, "wss://rpc.example");
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://user@localhost/db"));
    assert_eq!(cfg.start_block, Some(42));
    assert_eq!(cfg.state_path, None);
}

#[test]
fn from_lookup_requires_node_url() {
    let err = IndexerConfig::from_lookup(|_| None).unwrap_err();
    assert_eq!(field_of(err), "node_url");

    let err = IndexerConfig::from_lookup(|k| match k {
        "SUBSTRATE_URL" => Some("ws://node".into()),
        "START_BLOCK" => Some("soon".into()),
        _ => None,
    })
    .unwrap_err();
    assert_eq!(field_of(err), "start_block");
}

#[test]
fn sink_names() {
    assert_eq!(SinkName::parse("postgres").unwrap().as_str(), "postgres");
    assert_eq!(SinkName::parse(" es_1 ").unwrap().as_str(), "es_1");
    assert_eq!(field_of(SinkName::parse("").unwrap_err()), "sink");
    assert_eq!(field_of(SinkName::parse("a b").unwrap_err()), "sink");
    assert_eq!(field_of(SinkName::parse("pg.main").unwrap_err()), "sink");
}
