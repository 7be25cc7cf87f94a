//! The time-stamped event journal.
//!
//! Every line the simulator emits has the shape
//! `<HH:MM:SS.mmmmmm>, <origin>: <payload>` where the origin is `OS` for
//! scheduler and driver events and `Process: <pid>` for op-execution events.
//! This module provides:
//! 1. **Events:** [`OsEvent`] and [`OpEvent`], one variant per line shape.
//! 2. **Routing:** Monitor lines print immediately; file lines are stored in
//!    order and flushed at shutdown with a fixed configuration header.
//! 3. **Grouping:** A blank line is inserted whenever the origin flips from
//!    `OS` to `Process`, matching the original visual grouping of the log.
//!
//! The journal owns the simulation clock; it is the only component that
//! takes lap timestamps, which makes log-line ordering the event ordering.

use std::fs::File;
use std::io::{self, Write};

use crate::config::{ConfigData, LogDestination};
use crate::metadata::{Device, IoDirection, MemAction};
use crate::sim::clock::SimClock;
use crate::sim::pcb::{Pid, ProcessState};

/// Scheduler- and driver-level events, logged with the `OS` origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsEvent {
    /// Simulation startup banner.
    SimStart,
    /// Simulation shutdown banner.
    SimEnd,
    /// Main loop finished; teardown begins.
    SysStop,
    /// A process state transition, logged before the state field changes.
    StateChange {
        /// Process changing state.
        pid: Pid,
        /// State being left.
        from: ProcessState,
        /// State being entered.
        to: ProcessState,
    },
    /// A READY process was picked by the scheduler.
    Selected {
        /// Chosen process.
        pid: Pid,
        /// Its remaining run time in milliseconds.
        remaining_ms: u64,
    },
    /// A process reached the end of its op list or faulted.
    Ended {
        /// Terminating process.
        pid: Pid,
        /// Whether a memory failure caused the termination.
        seg_fault: bool,
    },
    /// A completed device transfer interrupted the CPU.
    Interrupted {
        /// Process whose transfer completed.
        pid: Pid,
        /// Device that finished.
        device: Device,
        /// Transfer direction.
        direction: IoDirection,
    },
    /// A process blocked on a device transfer.
    BlockedForIo {
        /// Blocking process.
        pid: Pid,
        /// Transfer direction.
        direction: IoDirection,
    },
    /// A CPU burst used up its quantum with cycles remaining.
    QuantumTimeout {
        /// Preempted process.
        pid: Pid,
    },
    /// Every active process is blocked; the CPU idles.
    Idle,
    /// An interrupt arrived and ended the idle wait.
    EndIdle,
}

impl OsEvent {
    fn payload(&self) -> String {
        match *self {
            Self::SimStart => "Simulator Start".to_string(),
            Self::SimEnd => "Simulator End".to_string(),
            Self::SysStop => "System Stop".to_string(),
            Self::StateChange { pid, from, to } => {
                format!("Process {pid} set from {from} to {to}")
            }
            Self::Selected { pid, remaining_ms } => {
                format!("Process {pid} selected with {remaining_ms} ms remaining")
            }
            Self::Ended { pid, .. } => format!("Process {pid} ended"),
            Self::Interrupted {
                pid,
                device,
                direction,
            } => format!("Interrupted by Process {pid}, {device} {direction}put operation"),
            Self::BlockedForIo { pid, direction } => {
                format!("Process {pid} blocked for {direction}put operation")
            }
            Self::QuantumTimeout { pid } => {
                format!("Process {pid} quantum time out, cpu process operation end")
            }
            Self::Idle => "CPU idle, all active processes blocked".to_string(),
            Self::EndIdle => "CPU interrupt, end idle".to_string(),
        }
    }
}

/// Op-execution events, logged with the `Process: <pid>` origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpEvent {
    /// A CPU burst was dispatched.
    CpuStart,
    /// A CPU burst ran its cycles down to zero (or was interrupted).
    CpuEnd,
    /// A device transfer started. Under preemptive policies (`blocking`)
    /// there is no matching end line: the later `Interrupted by Process N`
    /// OS line is the completion record.
    DevStart {
        /// Device being driven.
        device: Device,
        /// Transfer direction.
        direction: IoDirection,
        /// Whether the process blocks and the wait goes to an I/O worker.
        blocking: bool,
    },
    /// A device transfer completed in place (non-preemptive policies only).
    DevEnd {
        /// Device that finished.
        device: Device,
        /// Transfer direction.
        direction: IoDirection,
    },
    /// A memory request was dispatched.
    MemRequest {
        /// Allocate or access.
        action: MemAction,
        /// First byte of the requested interval.
        base: u32,
        /// Inclusive end distance of the requested interval.
        offset: u32,
    },
    /// Result of the memory request that was just dispatched.
    MemResult {
        /// Allocate or access.
        action: MemAction,
        /// Whether the request succeeded.
        success: bool,
    },
}

impl OpEvent {
    fn payload(&self) -> String {
        match *self {
            Self::CpuStart => "cpu process operation start".to_string(),
            Self::CpuEnd => "cpu process operation end".to_string(),
            Self::DevStart {
                device, direction, ..
            } => format!("{device} {direction}put operation start"),
            Self::DevEnd { device, direction } => {
                format!("{device} {direction}put operation end")
            }
            Self::MemRequest {
                action,
                base,
                offset,
            } => format!("mem {action} request ({base}, {offset})"),
            Self::MemResult { action, success } => {
                let verdict = if success { "successful" } else { "failed" };
                format!("{verdict} mem {action} request")
            }
        }
    }
}

/// Ordered event log with monitor/file routing.
#[derive(Debug)]
pub struct Journal {
    dest: LogDestination,
    clock: SimClock,
    lines: Vec<String>,
    last_msg_was_os: bool,
}

impl Journal {
    /// Creates an empty journal routed to the given destination.
    pub fn new(dest: LogDestination) -> Self {
        Self {
            dest,
            clock: SimClock::new(),
            lines: Vec::new(),
            last_msg_was_os: false,
        }
    }

    /// Zeroes the simulation clock; laps start here.
    pub fn start_clock(&mut self) {
        self.clock.zero();
    }

    /// Takes the final lap and stops the clock.
    pub fn stop_clock(&mut self) -> String {
        self.clock.stop()
    }

    /// Emits an OS-origin line.
    ///
    /// A terminating [`OsEvent::Ended`] caused by a memory fault carries the
    /// `Segmentation fault, ` prefix ahead of its payload.
    pub fn os_event(&mut self, event: OsEvent) {
        let stamp = self.clock.lap();
        let prefix = match event {
            OsEvent::Ended {
                seg_fault: true, ..
            } => "Segmentation fault, ",
            _ => "",
        };
        let line = format!("{stamp}, OS: {prefix}{}\n", event.payload());
        self.last_msg_was_os = true;
        self.emit(line);
    }

    /// Emits a process-origin line, inserting the grouping blank line when
    /// the previous line came from the OS.
    pub fn op_event(&mut self, pid: Pid, event: OpEvent) {
        let stamp = self.clock.lap();
        let lead = if self.last_msg_was_os { "\n" } else { "" };
        let mut line = format!("{lead}{stamp}, Process: {pid}, {}\n", event.payload());
        if matches!(event, OpEvent::DevStart { blocking: true, .. }) {
            // Spacing ahead of the blocked/state-change OS lines that follow.
            line.push('\n');
        }
        self.last_msg_was_os = false;
        self.emit(line);
    }

    /// Emits a bare separator line.
    pub fn blank_line(&mut self) {
        self.emit("\n".to_string());
    }

    /// Emits untimestamped text verbatim (the `Begin Simulation` banner).
    pub fn raw(&mut self, text: &str) {
        self.emit(text.to_string());
    }

    /// Prints to the monitor only, bypassing log-file storage. Used for the
    /// memory display, which is never written to the log file.
    pub fn monitor_only(&self, text: &str) {
        if self.dest.to_monitor() {
            print!("{text}");
        }
    }

    fn emit(&mut self, chunk: String) {
        if self.dest.to_monitor() {
            print!("{chunk}");
        }
        if self.dest.to_file() {
            self.lines.push(chunk);
        }
    }

    /// Stored log chunks, in emission order (empty unless the destination
    /// includes the log file).
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The stored log as one string.
    pub fn transcript(&self) -> String {
        self.lines.concat()
    }

    /// Writes the stored log to the configured log file: a fixed header
    /// summarizing the configuration, the event lines, and the terminator.
    ///
    /// Does nothing when the destination does not include the file.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from creating or writing the file.
    pub fn write_to_file(&self, config: &ConfigData) -> io::Result<()> {
        if !self.dest.to_file() {
            return Ok(());
        }
        let mut file = File::create(&config.log_path)?;
        writeln!(file, "==================================================")?;
        writeln!(file, "File Name                       : {}", config.metadata_path)?;
        writeln!(file, "CPU Scheduling                  : {}", config.sched_policy)?;
        writeln!(file, "Quantum Cycles                  : {}", config.quantum_cycles)?;
        writeln!(file, "Memory Available (KB)           : {}", config.mem_available)?;
        writeln!(file, "Processor Cycle Rate (ms/cycle) : {}", config.proc_cycle_rate)?;
        writeln!(file, "I/O Cycle Rate (ms/cycle)       : {}", config.io_cycle_rate)?;
        writeln!(file, "================")?;
        for chunk in &self.lines {
            write!(file, "{chunk}")?;
        }
        writeln!(file, "\nEnd Simulation - Complete")?;
        writeln!(file, "=========================")?;
        Ok(())
    }
}
