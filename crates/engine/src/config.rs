//! Configuration system for the OS simulator.
//!
//! This module defines the configuration structures and enums used to
//! parameterize a simulation run. It provides:
//! 1. **Structures:** `ConfigData`, the fully-validated configuration record.
//! 2. **Enums:** Scheduling policy and log destination codes.
//! 3. **Parsing:** The `.cnf` configuration-file format (`Descriptor: value`
//!    lines between `Start`/`End Simulator Configuration File` brackets).
//! 4. **Limits:** Accepted value ranges, checked during upload.
//!
//! `ConfigData` also derives serde traits so a configuration can be
//! round-tripped through JSON for tooling and tests.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Accepted ranges for configuration values.
///
/// Values outside these ranges are rejected during upload with
/// [`ConfigError::OutOfRange`].
pub mod limits {
    /// Highest accepted `Version/Phase` value.
    pub const VERSION_MAX: f64 = 10.0;

    /// Highest accepted round-robin quantum, in cycles.
    pub const QUANTUM_MAX: u32 = 100;

    /// Ceiling of the simulated memory arena, in bytes.
    pub const MEM_AVAILABLE_MAX: u32 = 102_400;

    /// Lowest accepted processor cycle rate, in ms per cycle.
    pub const PROC_RATE_MIN: u64 = 1;

    /// Highest accepted processor cycle rate, in ms per cycle.
    pub const PROC_RATE_MAX: u64 = 100;

    /// Lowest accepted I/O cycle rate, in ms per cycle.
    pub const IO_RATE_MIN: u64 = 1;

    /// Highest accepted I/O cycle rate, in ms per cycle.
    pub const IO_RATE_MAX: u64 = 1_000;
}

/// CPU scheduling policy codes.
///
/// The `-N` suffix marks non-preemptive policies, `-P` preemptive ones.
/// Under preemptive policies a `dev` op blocks its process and is served by a
/// background I/O worker; under non-preemptive policies device waits are
/// fused into the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingPolicy {
    /// First come first served, run to completion.
    #[serde(rename = "FCFS-N")]
    FcfsN,
    /// Shortest job first; sticky once a job has been picked.
    #[serde(rename = "SJF-N")]
    SjfN,
    /// Shortest remaining time first, re-evaluated on every dispatch.
    #[serde(rename = "SRTF-P")]
    SrtfP,
    /// First come first served with I/O-driven concurrency.
    #[serde(rename = "FCFS-P")]
    FcfsP,
    /// Round robin with quantum-bounded CPU bursts.
    #[serde(rename = "RR-P")]
    RrP,
}

impl SchedulingPolicy {
    /// Returns `true` for the policies under which `dev` ops block and spawn
    /// I/O workers.
    pub fn is_preemptive(self) -> bool {
        matches!(self, Self::SrtfP | Self::FcfsP | Self::RrP)
    }

    /// Canonical configuration-file spelling of the policy code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FcfsN => "FCFS-N",
            Self::SjfN => "SJF-N",
            Self::SrtfP => "SRTF-P",
            Self::FcfsP => "FCFS-P",
            Self::RrP => "RR-P",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "fcfs-n" => Some(Self::FcfsN),
            "sjf-n" => Some(Self::SjfN),
            "srtf-p" => Some(Self::SrtfP),
            "fcfs-p" => Some(Self::FcfsP),
            "rr-p" => Some(Self::RrP),
            _ => None,
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination of the simulator's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogDestination {
    /// Print every event line immediately.
    #[serde(rename = "Monitor")]
    Monitor,
    /// Store event lines and flush them to the log file at shutdown.
    #[serde(rename = "File")]
    File,
    /// Print immediately and flush to the log file at shutdown.
    #[serde(rename = "Both")]
    Both,
}

impl LogDestination {
    /// Whether event lines are printed to the monitor as they occur.
    pub fn to_monitor(self) -> bool {
        matches!(self, Self::Monitor | Self::Both)
    }

    /// Whether event lines are stored for the end-of-run log file.
    pub fn to_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }

    /// Canonical configuration-file spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monitor => "Monitor",
            Self::File => "File",
            Self::Both => "Both",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "monitor" => Some(Self::Monitor),
            "file" => Some(Self::File),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-validated configuration for one simulation run.
///
/// Produced by [`ConfigData::load`] from a `.cnf` file; every field has
/// passed the range checks in [`limits`] by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Configuration format version.
    pub version: f64,
    /// Path of the metadata op-code program to simulate.
    pub metadata_path: String,
    /// CPU scheduling policy for this run.
    pub sched_policy: SchedulingPolicy,
    /// Round-robin quantum, in CPU cycles.
    pub quantum_cycles: u32,
    /// Whether to dump the memory table after every memory operation.
    pub mem_display: bool,
    /// Size of the simulated memory arena, in bytes.
    pub mem_available: u32,
    /// Duration of one CPU cycle, in milliseconds.
    pub proc_cycle_rate: u64,
    /// Duration of one I/O cycle, in milliseconds.
    pub io_cycle_rate: u64,
    /// Where event-log lines go.
    pub log_dest: LogDestination,
    /// Path of the log file written at shutdown when the destination
    /// includes `File`.
    pub log_path: String,
}

impl ConfigData {
    /// Uploads and validates a `.cnf` configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read, a line is
    /// malformed, a descriptor is unknown, a value is out of range, or a
    /// required field is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::FileAccess {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses configuration text in the `.cnf` format.
    ///
    /// Bracket lines (`Start Simulator Configuration File`,
    /// `End Simulator Configuration File.`) and blank lines are skipped;
    /// every other line must be `Descriptor: value`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ConfigData::load`], minus file access.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::default();
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || is_bracket_line(line) {
                continue;
            }
            let (descriptor, value) = line
                .split_once(':')
                .ok_or_else(|| ConfigError::MalformedLine(line.to_string()))?;
            builder.apply(descriptor.trim(), value.trim())?;
        }
        builder.finish()
    }
}

impl fmt::Display for ConfigData {
    /// Screen dump of the configuration, used by the CLI's `-dc` switch.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config File Display")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "Version                : {}", self.version)?;
        writeln!(f, "Program file name      : {}", self.metadata_path)?;
        writeln!(f, "CPU schedule selection : {}", self.sched_policy)?;
        writeln!(f, "Quantum time           : {}", self.quantum_cycles)?;
        writeln!(
            f,
            "Memory display         : {}",
            if self.mem_display { "On" } else { "Off" }
        )?;
        writeln!(f, "Memory available       : {}", self.mem_available)?;
        writeln!(f, "Process cycle rate     : {}", self.proc_cycle_rate)?;
        writeln!(f, "I/O cycle rate         : {}", self.io_cycle_rate)?;
        writeln!(f, "Log to selection       : {}", self.log_dest)?;
        writeln!(f, "Log file name          : {}", self.log_path)
    }
}

fn is_bracket_line(line: &str) -> bool {
    line.starts_with("Start Simulator Configuration")
        || line.starts_with("End Simulator Configuration")
}

/// Accumulates configuration lines; every field must appear exactly once.
#[derive(Debug, Default)]
struct ConfigBuilder {
    version: Option<f64>,
    metadata_path: Option<String>,
    sched_policy: Option<SchedulingPolicy>,
    quantum_cycles: Option<u32>,
    mem_display: Option<bool>,
    mem_available: Option<u32>,
    proc_cycle_rate: Option<u64>,
    io_cycle_rate: Option<u64>,
    log_dest: Option<LogDestination>,
    log_path: Option<String>,
}

impl ConfigBuilder {
    fn apply(&mut self, descriptor: &str, value: &str) -> Result<(), ConfigError> {
        match descriptor {
            "Version/Phase" => {
                let version = parse_number::<f64>("Version/Phase", value)?;
                if !(0.0..=limits::VERSION_MAX).contains(&version) {
                    return Err(out_of_range("Version/Phase", value, "0 to 10"));
                }
                self.version = Some(version);
            }
            "File Path" => self.metadata_path = Some(value.to_string()),
            "CPU Scheduling Code" => {
                let policy = SchedulingPolicy::from_code(value).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: "CPU Scheduling Code",
                        value: value.to_string(),
                    }
                })?;
                self.sched_policy = Some(policy);
            }
            "Quantum Time (cycles)" => {
                let quantum = parse_number::<u32>("Quantum Time (cycles)", value)?;
                if quantum > limits::QUANTUM_MAX {
                    return Err(out_of_range("Quantum Time (cycles)", value, "0 to 100"));
                }
                self.quantum_cycles = Some(quantum);
            }
            "Memory Display (On/Off)" => {
                let on = match value.to_ascii_lowercase().as_str() {
                    "on" => true,
                    "off" => false,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            field: "Memory Display (On/Off)",
                            value: value.to_string(),
                        });
                    }
                };
                self.mem_display = Some(on);
            }
            "Memory Available (KB)" => {
                let available = parse_number::<u32>("Memory Available (KB)", value)?;
                if available > limits::MEM_AVAILABLE_MAX {
                    return Err(out_of_range("Memory Available (KB)", value, "0 to 102400"));
                }
                self.mem_available = Some(available);
            }
            "Processor Cycle Time (msec)" => {
                let rate = parse_number::<u64>("Processor Cycle Time (msec)", value)?;
                if !(limits::PROC_RATE_MIN..=limits::PROC_RATE_MAX).contains(&rate) {
                    return Err(out_of_range("Processor Cycle Time (msec)", value, "1 to 100"));
                }
                self.proc_cycle_rate = Some(rate);
            }
            "I/O Cycle Time (msec)" => {
                let rate = parse_number::<u64>("I/O Cycle Time (msec)", value)?;
                if !(limits::IO_RATE_MIN..=limits::IO_RATE_MAX).contains(&rate) {
                    return Err(out_of_range("I/O Cycle Time (msec)", value, "1 to 1000"));
                }
                self.io_cycle_rate = Some(rate);
            }
            "Log To" => {
                let dest =
                    LogDestination::from_code(value).ok_or_else(|| ConfigError::InvalidValue {
                        field: "Log To",
                        value: value.to_string(),
                    })?;
                self.log_dest = Some(dest);
            }
            "Log File Path" => self.log_path = Some(value.to_string()),
            other => return Err(ConfigError::UnknownDescriptor(other.to_string())),
        }
        Ok(())
    }

    fn finish(self) -> Result<ConfigData, ConfigError> {
        Ok(ConfigData {
            version: self.version.ok_or(ConfigError::MissingField("Version/Phase"))?,
            metadata_path: self
                .metadata_path
                .ok_or(ConfigError::MissingField("File Path"))?,
            sched_policy: self
                .sched_policy
                .ok_or(ConfigError::MissingField("CPU Scheduling Code"))?,
            quantum_cycles: self
                .quantum_cycles
                .ok_or(ConfigError::MissingField("Quantum Time (cycles)"))?,
            mem_display: self
                .mem_display
                .ok_or(ConfigError::MissingField("Memory Display (On/Off)"))?,
            mem_available: self
                .mem_available
                .ok_or(ConfigError::MissingField("Memory Available (KB)"))?,
            proc_cycle_rate: self
                .proc_cycle_rate
                .ok_or(ConfigError::MissingField("Processor Cycle Time (msec)"))?,
            io_cycle_rate: self
                .io_cycle_rate
                .ok_or(ConfigError::MissingField("I/O Cycle Time (msec)"))?,
            log_dest: self.log_dest.ok_or(ConfigError::MissingField("Log To"))?,
            log_path: self
                .log_path
                .ok_or(ConfigError::MissingField("Log File Path"))?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn out_of_range(field: &'static str, value: &str, range: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value: value.to_string(),
        range,
    }
}
