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

#[path = "../common/mod.rs"]
mod common;
use common::*;
use flamewire_offchain_indexer::{ChainEvent, EventFilter, DEFAULT_EVENT_METHODS};

#[test]
fn all_accepts_everything() {
    let filter = EventFilter::all();
    assert!(filter.matches("System", "ExtrinsicSuccess"));
    assert!(filter.accepts(&ev("Anything", 0)));
    assert!(!filter.is_empty());
    assert_eq!(filter.entries(), None);
}

#[test]
fn bare_method_matches_any_pallet() {
    let filter = EventFilter::methods(["SpaceCreated"]);
    assert!(filter.matches("Spaces", "SpaceCreated"));
    assert!(filter.matches("Other", "SpaceCreated"));
    assert!(!filter.matches("Spaces", "SpaceUpdated"));
}

#[test]
fn qualified_entry_matches_its_pallet_only() {
    let filter = EventFilter::methods(["Posts.PostCreated"]);
    assert!(filter.matches("Posts", "PostCreated"));
    assert!(!filter.matches("Spaces", "PostCreated"));
    assert!(!filter.accepts(&ev("PostCreated", 0)));
    assert!(filter.accepts(&ChainEvent::new("Posts", "PostCreated", vec![], 0)));
}

#[test]
fn default_list_covers_social_events() {
    let filter = EventFilter::default_methods();
    for method in DEFAULT_EVENT_METHODS {
        assert!(filter.matches("Spaces", method));
    }
    assert!(filter.accepts(&ev("PostReactionCreated", 3)));
    assert!(!filter.accepts(&ev("ExtrinsicSuccess", 4)));
    assert!(!filter.accepts(&ChainEvent::new("Balances", "Transfer", vec![], 1)));
}

#[test]
fn empty_list_rejects_everything() {
    let filter = EventFilter::methods(Vec::<String>::new());
    assert!(filter.is_empty());
    assert!(!filter.accepts(&ev("SpaceCreated", 0)));
    assert_eq!(filter.entries(), Some(vec![]));
}

#[test]
fn entries_are_sorted() {
    let filter = EventFilter::methods(["PostCreated", "AccountFollowed", "Spaces.SpaceCreated"]);
    assert_eq!(
        filter.entries(),
        Some(vec!["AccountFollowed", "PostCreated", "Spaces.SpaceCreated"])
    );
}
