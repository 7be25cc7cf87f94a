//! Operating-system scheduling simulator library.
//!
//! This crate simulates the execution of metadata op-code programs under a
//! configurable operating system, with the following:
//! 1. **Front-ends:** The `.cnf` configuration parser and the metadata
//!    op-code program parser.
//! 2. **PCB:** Process control blocks cut from the flat op-code stream, one
//!    per `app start`/`app end` block.
//! 3. **Scheduling:** Five CPU policies, FCFS-N and SJF-N (non-preemptive) plus
//!    SRTF-P, FCFS-P, and RR-P (preemptive), over a NEW/READY/RUNNING/BLOCKED/
//!    EXIT state machine.
//! 4. **Memory:** Accounting-only allocate/access over a flat simulated
//!    arena; a failed request is a segmentation fault fatal to its process.
//! 5. **Interrupts:** A bounded FIFO fed by per-device I/O worker threads,
//!    consumed by the single-threaded driver.
//! 6. **Logging:** A time-stamped event journal printed to the monitor,
//!    flushed to a log file, or both.

/// Configuration data, policy codes, and the `.cnf` parser.
pub mod config;
/// Error taxonomy for uploads and the run itself.
pub mod error;
/// Op-code model and the metadata program parser.
pub mod metadata;
/// The simulation core: clock, PCB, scheduler, memory, interrupts, journal,
/// and driver.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;

/// Validated configuration record; build with `ConfigData::load`.
pub use crate::config::{ConfigData, LogDestination, SchedulingPolicy};
/// Top-level error type.
pub use crate::error::SimError;
/// One op code of a metadata program.
pub use crate::metadata::OpCode;
/// One simulation run; construct with `Simulation::new`, drive with `run`.
pub use crate::sim::driver::{SimReport, Simulation};
/// Run statistics, serializable to JSON.
pub use crate::stats::SimStats;
