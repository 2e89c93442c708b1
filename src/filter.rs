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

use std::collections::HashSet;

use crate::types::ChainEvent;

/// Event methods the social-network sinks know how to index.
pub const DEFAULT_EVENT_METHODS: &[&str] = &[
    "AccountFollowed",
    "AccountUnfollowed",
    "SpaceCreated",
    "SpaceUpdated",
    "SpaceFollowed",
    "SpaceUnfollowed",
    "SpaceOwnershipTransferAccepted",
    "PostCreated",
    "PostUpdated",
    "PostShared",
    "PostReactionCreated",
    "PostReactionUpdated",
    "PostReactionDeleted",
    "ProfileCreated",
    "ProfileUpdated",
];

/// Allow-list of event method names.
///
/// Entries are either a bare method (`SpaceCreated`) which matches in any
/// pallet, or pallet-qualified (`Spaces.SpaceCreated`).
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    allowed: Option<HashSet<String>>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self { allowed: None }
    }

    pub fn methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(methods.into_iter().map(Into::into).collect()),
        }
    }

    pub fn default_methods() -> Self {
        Self::methods(DEFAULT_EVENT_METHODS.iter().copied())
    }

    pub fn matches(&self, pallet: &str, method: &str) -> bool {
        match &self.allowed {
            None => true,
            Some(set) => set.contains(method) || set.contains(&format!("{pallet}.{method}")),
        }
    }

    pub fn accepts(&self, event: &ChainEvent) -> bool {
        self.matches(event.pallet_name(), event.method_name())
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.as_ref().is_some_and(HashSet::is_empty)
    }

    /// Allowed entries in sorted order, `None` when every event passes.
    pub fn entries(&self) -> Option<Vec<&str>> {
        self.allowed.as_ref().map(|set| {
            let mut entries: Vec<&str> = set.iter().map(String::as_str).collect();
            entries.sort_unstable();
            entries
        })
    }
}
