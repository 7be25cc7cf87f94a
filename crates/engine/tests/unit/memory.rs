//! Memory manager tests.
//!
//! Boundary behaviour at the arena edge and at record edges, overlap
//! rejection, pid scoping, the memory display, and property tests over
//! random allocation sequences.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use ossim_core::sim::memory::{MemoryOutcome, MemoryRequest, MemoryTable};

const ARENA: u32 = 1024;

fn allocate(table: &mut MemoryTable, pid: usize, base: u32, offset: u32) -> MemoryOutcome {
    table.handle(pid, MemoryRequest::Allocate { base, offset })
}

fn access(table: &mut MemoryTable, pid: usize, base: u32, offset: u32) -> MemoryOutcome {
    table.handle(pid, MemoryRequest::Access { base, offset })
}

#[test]
fn initialize_is_a_no_op_on_the_table() {
    let mut table = MemoryTable::new(ARENA);
    assert_eq!(table.handle(0, MemoryRequest::Initialize), MemoryOutcome::Initialized);
    assert!(table.records().is_empty());
}

#[test]
fn allocation_at_the_last_byte_succeeds() {
    let mut table = MemoryTable::new(ARENA);
    assert_eq!(allocate(&mut table, 0, ARENA - 1, 0), MemoryOutcome::AllocateSuccess);
}

#[test]
fn allocation_one_past_the_arena_fails() {
    let mut table = MemoryTable::new(ARENA);
    assert_eq!(allocate(&mut table, 0, ARENA - 1, 1), MemoryOutcome::AllocateFailure);
}

#[test]
fn allocation_with_base_outside_the_arena_fails() {
    let mut table = MemoryTable::new(ARENA);
    assert_eq!(allocate(&mut table, 0, ARENA, 0), MemoryOutcome::AllocateFailure);
}

#[test]
fn failed_allocation_records_nothing() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, ARENA, 64);
    assert!(table.records().is_empty());
}

#[test]
fn overlapping_allocation_fails_inclusively_at_both_ends() {
    let mut table = MemoryTable::new(ARENA);
    assert_eq!(allocate(&mut table, 0, 100, 50), MemoryOutcome::AllocateSuccess);

    // Touching either inclusive end is a conflict.
    assert_eq!(allocate(&mut table, 1, 150, 10), MemoryOutcome::AllocateFailure);
    assert_eq!(allocate(&mut table, 1, 90, 10), MemoryOutcome::AllocateFailure);

    // One byte beyond either end is fine.
    assert_eq!(allocate(&mut table, 1, 151, 10), MemoryOutcome::AllocateSuccess);
    assert_eq!(allocate(&mut table, 1, 80, 9), MemoryOutcome::AllocateSuccess);
}

#[test]
fn access_at_exact_record_boundaries_succeeds() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 100, 50);
    assert_eq!(access(&mut table, 0, 100, 50), MemoryOutcome::AccessSuccess);
    assert_eq!(access(&mut table, 0, 150, 0), MemoryOutcome::AccessSuccess);
}

#[test]
fn access_one_byte_past_the_record_fails() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 100, 50);
    assert_eq!(access(&mut table, 0, 100, 51), MemoryOutcome::AccessFailure);
    assert_eq!(access(&mut table, 0, 99, 10), MemoryOutcome::AccessFailure);
}

#[test]
fn access_without_any_allocation_fails() {
    let mut table = MemoryTable::new(ARENA);
    assert_eq!(access(&mut table, 0, 0, 10), MemoryOutcome::AccessFailure);
}

#[test]
fn access_requires_the_owning_pid() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 100, 50);
    assert_eq!(access(&mut table, 1, 110, 10), MemoryOutcome::AccessFailure);
    assert_eq!(access(&mut table, 0, 110, 10), MemoryOutcome::AccessSuccess);
}

#[test]
fn deallocate_removes_only_the_given_pid() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 0, 10);
    allocate(&mut table, 1, 20, 10);
    allocate(&mut table, 0, 40, 10);

    assert_eq!(table.handle(0, MemoryRequest::Deallocate), MemoryOutcome::Deallocated(0));
    assert_eq!(table.records().len(), 1);
    assert_eq!(table.records()[0].pid, 1);
}

#[test]
fn deallocated_space_can_be_reallocated() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 0, 100);
    table.handle(0, MemoryRequest::Deallocate);
    assert_eq!(allocate(&mut table, 1, 50, 10), MemoryOutcome::AllocateSuccess);
}

#[test]
fn deinitialize_clears_everything() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 0, 10);
    allocate(&mut table, 1, 20, 10);
    assert_eq!(table.handle(0, MemoryRequest::Deinitialize), MemoryOutcome::Deinitialized);
    assert!(table.records().is_empty());
}

#[test]
fn display_shows_used_and_open_rows() {
    let mut table = MemoryTable::new(ARENA);
    allocate(&mut table, 0, 0, 10);
    let display = table.render_display(MemoryOutcome::AllocateSuccess);
    assert!(display.contains("After allocate success"));
    assert!(display.contains("0 [ Used, P# 0, 0-10 ] 10"));
    assert!(display.contains("11 [ Open, P# x, 0-0 ] 1023"));
}

#[test]
fn display_after_deinitialize_has_no_open_row() {
    let mut table = MemoryTable::new(ARENA);
    table.handle(0, MemoryRequest::Deinitialize);
    let display = table.render_display(MemoryOutcome::Deinitialized);
    assert!(display.contains("No memory configured"));
    assert!(!display.contains("Open"));
}

#[test]
fn display_names_the_cleared_process() {
    let table = MemoryTable::new(ARENA);
    let display = table.render_display(MemoryOutcome::Deallocated(3));
    assert!(display.contains("After clear process 3 success"));
}

proptest! {
    /// However allocations land, live records never overlap and never
    /// reach past the arena.
    #[test]
    fn live_records_never_overlap(requests in prop::collection::vec((0u32..2048, 0u32..64), 1..40)) {
        let mut table = MemoryTable::new(ARENA);
        for (pid, (base, offset)) in requests.into_iter().enumerate() {
            allocate(&mut table, pid, base, offset);
        }
        let records = table.records();
        for record in records {
            prop_assert!(record.base + record.offset < ARENA);
        }
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                let disjoint = a.base + a.offset < b.base || b.base + b.offset < a.base;
                prop_assert!(disjoint, "records {a:?} and {b:?} overlap");
            }
        }
    }

    /// A successful allocation is immediately accessible to its owner over
    /// the full interval, and to nobody else.
    #[test]
    fn successful_allocation_is_owner_accessible(base in 0u32..ARENA, offset in 0u32..64) {
        let mut table = MemoryTable::new(ARENA);
        if allocate(&mut table, 0, base, offset) == MemoryOutcome::AllocateSuccess {
            prop_assert_eq!(access(&mut table, 0, base, offset), MemoryOutcome::AccessSuccess);
            prop_assert_eq!(access(&mut table, 1, base, offset), MemoryOutcome::AccessFailure);
        }
    }
}
