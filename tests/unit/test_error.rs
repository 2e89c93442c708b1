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

use flamewire_offchain_indexer::error::IndexerError;
use std::time::Duration;
use subxt::Error as SubxtError;

#[test]
fn construct_errors() {
    let e = IndexerError::BlockNotFound { block: 1 };
    assert_eq!(format!("{e}"), "Block 1 not found");

    let e = IndexerError::ConnectionFailed {
        url: "wss://node".into(),
        source: Box::new(SubxtError::Other("conn".into())),
    };
    assert!(format!("{e}").contains("Connection to wss://node failed"));

    let e = IndexerError::invalid_config("field", "bad");
    assert_eq!(format!("{e}"), "Invalid config for `field`: bad");

    let e = IndexerError::handler_failed("postgres", 11, "X");
    assert_eq!(format!("{e}"), "Handler postgres failed at block 11: X");

    let e = IndexerError::checkpoint("write_state", "json", std::io::Error::other("fail"));
    assert_eq!(
        format!("{e}"),
        "Checkpoint write_state failed using json: fail"
    );

    let e = IndexerError::MetadataUpdateFailed {
        source: Box::new(SubxtError::Other("meta".into())),
    };
    assert!(format!("{e}").contains("Metadata update failed"));

    let e = IndexerError::EventDecodingFailed {
        index: 3,
        block: 1,
        source: Box::new(SubxtError::Other("decode".into())),
    };
    assert!(format!("{e}").contains("Failed to decode event #3 in block 1"));
}

#[test]
fn loop_errors() {
    let e = IndexerError::Timeout {
        operation: "sink elastic".into(),
        after: Duration::from_millis(20),
    };
    assert_eq!(format!("{e}"), "sink elastic timed out after 20ms");

    let e = IndexerError::CircuitOpen {
        operation: "events_at".into(),
    };
    assert!(format!("{e}").contains("refusing events_at"));

    let e = IndexerError::AllSinksFailed { block: 11 };
    assert!(format!("{e}").contains("last planned block 11"));

    let e = IndexerError::Subscription {
        message: "closed".into(),
    };
    assert!(format!("{e}").contains("closed"));
}

#[test]
fn sources_are_chained() {
    use std::error::Error;
    let e = IndexerError::handler_failed("es", 2, std::io::Error::other("refused"));
    assert_eq!(e.source().map(|s| s.to_string()), Some("refused".into()));

    let e: IndexerError = SubxtError::Other("x".into()).into();
    assert!(matches!(e, IndexerError::Subxt(_)));
}
