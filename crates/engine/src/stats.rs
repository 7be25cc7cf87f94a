//! Simulation statistics collection and reporting.
//!
//! Tracks run-level counters for the simulator: processes loaded and
//! completed, segmentation faults, simulated CPU and I/O time, quantum
//! expirations, interrupts serviced, and idle waits. Serializable so the CLI
//! can dump a run's statistics as JSON.

use std::time::Instant;

use serde::Serialize;

/// Counters for one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,

    /// Processes built into the PCB at startup.
    pub processes_loaded: u64,
    /// Processes that reached EXIT.
    pub processes_completed: u64,
    /// Processes terminated by a failed memory allocate or access.
    pub seg_faults: u64,

    /// CPU cycles executed across all processes.
    pub cpu_cycles: u64,
    /// Simulated CPU time, in milliseconds.
    pub cpu_ms_simulated: u64,
    /// Device ops dispatched.
    pub io_ops_dispatched: u64,
    /// Simulated I/O time, in milliseconds.
    pub io_ms_simulated: u64,

    /// Quantum windows that closed with cycles remaining.
    pub quantum_expirations: u64,
    /// Interrupts consumed from the interrupt queue.
    pub interrupts_serviced: u64,
    /// Times the driver idled because every active process was blocked.
    pub idle_waits: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            processes_loaded: 0,
            processes_completed: 0,
            seg_faults: 0,
            cpu_cycles: 0,
            cpu_ms_simulated: 0,
            io_ops_dispatched: 0,
            io_ms_simulated: 0,
            quantum_expirations: 0,
            interrupts_serviced: 0,
            idle_waits: 0,
        }
    }
}

impl SimStats {
    /// Wall-clock seconds since the statistics were created.
    pub fn wall_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Prints a human-readable summary.
    pub fn print(&self) {
        println!("==== Simulation Statistics ====");
        println!(
            "Processes           : {} loaded, {} completed ({} seg faults)",
            self.processes_loaded, self.processes_completed, self.seg_faults
        );
        println!(
            "CPU                 : {} cycles, {} ms simulated",
            self.cpu_cycles, self.cpu_ms_simulated
        );
        println!(
            "I/O                 : {} ops, {} ms simulated",
            self.io_ops_dispatched, self.io_ms_simulated
        );
        println!(
            "Scheduling          : {} quantum expirations, {} interrupts, {} idle waits",
            self.quantum_expirations, self.interrupts_serviced, self.idle_waits
        );
        println!("Wall time           : {:.3} s", self.wall_seconds());
    }
}
