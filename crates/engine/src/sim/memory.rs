//! Simulated memory manager.
//!
//! No real memory is ever allocated on behalf of simulated processes; the
//! manager keeps accounting records against a flat byte-addressed arena of
//! `mem_available` bytes. A request `(base, offset)` denotes the inclusive
//! interval `[base, base + offset]`. Records are kept in allocation order and
//! there is no compaction or reuse.

use crate::sim::pcb::Pid;

const RULE: &str = "--------------------------------------------------\n";

/// A memory operation, dispatched through [`MemoryTable::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRequest {
    /// Start-of-run no-op; exists so the initial memory display is emitted.
    Initialize,
    /// Claim `[base, base + offset]` for the requesting process.
    Allocate {
        /// First byte of the requested interval.
        base: u32,
        /// Inclusive end distance of the requested interval.
        offset: u32,
    },
    /// Touch `[base, base + offset]`, which must lie inside a region the
    /// requesting process allocated earlier.
    Access {
        /// First byte of the requested interval.
        base: u32,
        /// Inclusive end distance of the requested interval.
        offset: u32,
    },
    /// Drop every record owned by the requesting process.
    Deallocate,
    /// Drop the whole table at end of run.
    Deinitialize,
}

/// Result of a memory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOutcome {
    /// Table initialized (no records changed).
    Initialized,
    /// Allocation recorded.
    AllocateSuccess,
    /// Allocation rejected: out of bounds or overlapping a live record.
    AllocateFailure,
    /// Access fell inside a record owned by the requesting process.
    AccessSuccess,
    /// Access fell outside every record owned by the requesting process.
    AccessFailure,
    /// All records of the given process dropped.
    Deallocated(Pid),
    /// Table cleared.
    Deinitialized,
}

impl MemoryOutcome {
    /// Whether this outcome is fatal to the requesting process.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::AllocateFailure | Self::AccessFailure)
    }
}

/// One live allocation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRecord {
    /// Owning process.
    pub pid: Pid,
    /// First byte of the region.
    pub base: u32,
    /// Inclusive end distance; the region covers `[base, base + offset]`.
    pub offset: u32,
}

impl MemoryRecord {
    fn end(&self) -> u32 {
        self.base + self.offset
    }
}

/// Ordered list of allocation records over a flat simulated arena.
#[derive(Debug)]
pub struct MemoryTable {
    records: Vec<MemoryRecord>,
    available: u32,
}

impl MemoryTable {
    /// Creates an empty table over an arena of `available` bytes.
    pub fn new(available: u32) -> Self {
        Self {
            records: Vec::new(),
            available,
        }
    }

    /// Live records, in allocation order.
    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    /// Arena size in bytes.
    pub fn available(&self) -> u32 {
        self.available
    }

    /// Dispatches one memory operation on behalf of `pid`.
    pub fn handle(&mut self, pid: Pid, request: MemoryRequest) -> MemoryOutcome {
        match request {
            MemoryRequest::Initialize => MemoryOutcome::Initialized,
            MemoryRequest::Allocate { base, offset } => {
                if self.allocate(pid, base, offset) {
                    MemoryOutcome::AllocateSuccess
                } else {
                    MemoryOutcome::AllocateFailure
                }
            }
            MemoryRequest::Access { base, offset } => {
                if self.access_ok(pid, base, offset) {
                    MemoryOutcome::AccessSuccess
                } else {
                    MemoryOutcome::AccessFailure
                }
            }
            MemoryRequest::Deallocate => {
                self.records.retain(|record| record.pid != pid);
                MemoryOutcome::Deallocated(pid)
            }
            MemoryRequest::Deinitialize => {
                self.records.clear();
                MemoryOutcome::Deinitialized
            }
        }
    }

    /// Records `[base, base + offset]` for `pid` if it fits the arena and
    /// intersects no live record. Intervals are inclusive on both ends.
    fn allocate(&mut self, pid: Pid, base: u32, offset: u32) -> bool {
        let Some(end) = base.checked_add(offset) else {
            return false;
        };
        if end >= self.available {
            return false;
        }
        if self
            .records
            .iter()
            .any(|record| base <= record.end() && record.base <= end)
        {
            return false;
        }
        self.records.push(MemoryRecord { pid, base, offset });
        true
    }

    /// An access succeeds iff some record owned by `pid` fully contains the
    /// requested interval.
    fn access_ok(&self, pid: Pid, base: u32, offset: u32) -> bool {
        let Some(end) = base.checked_add(offset) else {
            return false;
        };
        self.records
            .iter()
            .any(|record| record.pid == pid && record.base <= base && end <= record.end())
    }

    /// Renders the memory display emitted after each operation when the
    /// configuration's memory display is on: one `Used` row per record and a
    /// trailing `Open` pseudo-row for the free remainder (absent once the
    /// table has been deinitialized).
    pub fn render_display(&self, outcome: MemoryOutcome) -> String {
        let mut out = String::from(RULE);
        out.push_str(&match outcome {
            MemoryOutcome::Initialized => "After memory initialization\n".to_string(),
            MemoryOutcome::AllocateSuccess => "After allocate success\n".to_string(),
            MemoryOutcome::AllocateFailure => "After allocate failure\n".to_string(),
            MemoryOutcome::AccessSuccess => "After access success\n".to_string(),
            MemoryOutcome::AccessFailure => "After access failure\n".to_string(),
            MemoryOutcome::Deallocated(pid) => format!("After clear process {pid} success\n"),
            MemoryOutcome::Deinitialized => {
                "After clear all process success\nNo memory configured\n".to_string()
            }
        });

        let mut display_base: u32 = 0;
        for record in &self.records {
            out.push_str(&format!(
                "{} [ Used, P# {}, {}-{} ] {}\n",
                display_base,
                record.pid,
                record.base,
                record.end(),
                display_base + record.offset
            ));
            display_base += record.offset + 1;
        }

        if outcome != MemoryOutcome::Deinitialized {
            out.push_str(&format!(
                "{} [ Open, P# x, 0-0 ] {}\n",
                display_base,
                self.available.saturating_sub(1)
            ));
        }
        out.push_str(RULE);
        out
    }
}
