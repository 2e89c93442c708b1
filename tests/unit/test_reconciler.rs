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

use flamewire_offchain_indexer::{
    reconcile, BlockPlan, Reconciliation, SinkCheckpoint, SinkCursor, SinkStatus,
};

fn plan(cursors: &[SinkCursor]) -> BlockPlan {
    match reconcile(cursors) {
        Reconciliation::Fetch(plan) => plan,
        Reconciliation::Halt => panic!("expected a block plan"),
    }
}

fn faulted(block: u64) -> SinkCursor {
    SinkCursor::restore(&SinkCheckpoint::failed(block, "X"))
}

#[test]
fn slower_sink_drives_the_next_block() {
    let p = plan(&[SinkCursor::active(10), SinkCursor::active(12)]);
    assert_eq!(p.block, 11);
    assert!(p.is_active(0));
    assert!(!p.is_active(1));
    assert_eq!(p.participants().collect::<Vec<_>>(), vec![0]);

    let p = plan(&[SinkCursor::active(15), SinkCursor::active(7)]);
    assert_eq!(p.block, 8);
    assert_eq!(p.active, vec![false, true]);
}

#[test]
fn equal_sinks_share_the_block() {
    let p = plan(&[SinkCursor::active(10), SinkCursor::active(10)]);
    assert_eq!(p.block, 11);
    assert_eq!(p.active, vec![true, true]);
}

#[test]
fn faulted_sink_is_ignored() {
    // the faulted sink is behind but must not hold the healthy one back
    let p = plan(&[faulted(3), SinkCursor::active(10)]);
    assert_eq!(p.block, 11);
    assert_eq!(p.active, vec![false, true]);

    let p = plan(&[SinkCursor::active(4), faulted(9)]);
    assert_eq!(p.block, 5);
    assert_eq!(p.active, vec![true, false]);
}

#[test]
fn all_faulted_halts() {
    assert_eq!(reconcile(&[faulted(10), faulted(11)]), Reconciliation::Halt);
    assert_eq!(reconcile(&[]), Reconciliation::Halt);
}

#[test]
fn single_sink() {
    let p = plan(&[SinkCursor::active(0)]);
    assert_eq!(p.block, 1);
    assert!(p.is_active(0));
    assert!(!p.is_active(1));
}

#[test]
fn advance_moves_forward_only() {
    let mut cursor = SinkCursor::active(10);
    assert!(cursor.advance(11));
    assert_eq!(cursor.last_processed_block(), 11);
    assert!(!cursor.advance(9));
    assert_eq!(cursor.last_processed_block(), 11);
}

#[test]
fn fault_is_one_way() {
    let mut cursor = SinkCursor::active(10);
    cursor.fault(11, "boom");
    assert!(cursor.is_faulted());
    assert_eq!(cursor.last_processed_block(), 10);
    assert_eq!(
        cursor.status(),
        &SinkStatus::Faulted {
            error: "boom".into()
        }
    );

    assert!(!cursor.advance(11));
    cursor.fault(12, "again");
    assert_eq!(cursor.last_processed_block(), 10);
    assert_eq!(cursor.checkpoint(), SinkCheckpoint::failed(10, "boom"));
}

#[test]
fn resume_drops_error_restore_keeps_it() {
    let stored = SinkCheckpoint::failed(10, "X");

    let resumed = SinkCursor::resume(&stored);
    assert_eq!(resumed.status(), &SinkStatus::Active);
    assert_eq!(resumed.last_processed_block(), 10);
    assert_eq!(resumed.checkpoint(), SinkCheckpoint::at(10));

    let restored = SinkCursor::restore(&stored);
    assert!(restored.is_faulted());
    assert_eq!(restored.checkpoint(), stored);
}

#[test]
fn fault_at_genesis_saturates() {
    let mut cursor = SinkCursor::active(0);
    cursor.fault(0, "bad");
    assert_eq!(cursor.last_processed_block(), 0);
}
