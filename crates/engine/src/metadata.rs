//! Metadata op-code programs.
//!
//! A metadata program is a flat stream of op codes describing one or more
//! applications. This module provides:
//! 1. **Model:** [`OpCode`] and its argument enums, one variant per command.
//! 2. **Parsing:** The metadata file format: one op per line (or several
//!    separated by `;`) between `Start`/`End Program Meta-Data Code`
//!    brackets, with structural validation of the `sys`/`app` bracketing.
//! 3. **Rendering:** Canonical source text for each op (`Display`), so that
//!    parsing a rendered program yields the original op stream.
//!
//! A well-formed program begins with `sys start`, ends with `sys end`, and
//! contains `cpu`, `dev`, and `mem` ops only inside `app start`/`app end`
//! blocks.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Direction of a simulated device transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoDirection {
    /// Input device op (`dev in`).
    In,
    /// Output device op (`dev out`).
    Out,
}

impl IoDirection {
    /// Source spelling; also the stem of "input"/"output" in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }
}

impl fmt::Display for IoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated devices a `dev` op may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    /// Ethernet adapter.
    Ethernet,
    /// Hard drive.
    HardDrive,
    /// Keyboard.
    Keyboard,
    /// Monitor.
    Monitor,
    /// Printer.
    Printer,
    /// Serial port.
    Serial,
    /// Sound signal generator.
    SoundSignal,
    /// USB port.
    Usb,
    /// Video signal generator.
    VideoSignal,
}

impl Device {
    /// Source spelling of the device name, as it appears in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::HardDrive => "hard drive",
            Self::Keyboard => "keyboard",
            Self::Monitor => "monitor",
            Self::Printer => "printer",
            Self::Serial => "serial",
            Self::SoundSignal => "sound signal",
            Self::Usb => "usb",
            Self::VideoSignal => "video signal",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "ethernet" => Some(Self::Ethernet),
            "hard drive" => Some(Self::HardDrive),
            "keyboard" => Some(Self::Keyboard),
            "monitor" => Some(Self::Monitor),
            "printer" => Some(Self::Printer),
            "serial" => Some(Self::Serial),
            "sound signal" => Some(Self::SoundSignal),
            "usb" => Some(Self::Usb),
            "video signal" => Some(Self::VideoSignal),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of simulated memory operation a `mem` op requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemAction {
    /// Claim a region of the simulated arena.
    Allocate,
    /// Touch a region previously allocated by the same process.
    Access,
}

impl MemAction {
    /// Source spelling, as it appears in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allocate => "allocate",
            Self::Access => "access",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "allocate" => Some(Self::Allocate),
            "access" => Some(Self::Access),
            _ => None,
        }
    }
}

impl fmt::Display for MemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One op code of a metadata program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpCode {
    /// `sys start`: opens the program.
    SysStart,
    /// `sys end`: closes the program.
    SysEnd,
    /// `app start`: opens an application block.
    AppStart,
    /// `app end`: closes an application block.
    AppEnd,
    /// `cpu process, N`: a CPU burst of `N` cycles.
    Cpu {
        /// Remaining CPU cycles; decremented in place while running.
        cycles: u32,
    },
    /// `dev <in|out>, <device>, N`: a device transfer of `N` I/O cycles.
    Dev {
        /// Transfer direction.
        direction: IoDirection,
        /// Device being driven.
        device: Device,
        /// I/O cycles the transfer takes.
        cycles: u32,
    },
    /// `mem <allocate|access>, B, O`: a memory request over `[B, B+O]`.
    Mem {
        /// Allocate or access.
        action: MemAction,
        /// First byte of the requested interval.
        base: u32,
        /// Inclusive end distance of the requested interval.
        offset: u32,
    },
}

impl fmt::Display for OpCode {
    /// Renders the canonical source text of the op.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SysStart => f.write_str("sys start"),
            Self::SysEnd => f.write_str("sys end"),
            Self::AppStart => f.write_str("app start"),
            Self::AppEnd => f.write_str("app end"),
            Self::Cpu { cycles } => write!(f, "cpu process, {cycles}"),
            Self::Dev {
                direction,
                device,
                cycles,
            } => write!(f, "dev {direction}, {device}, {cycles}"),
            Self::Mem {
                action,
                base,
                offset,
            } => write!(f, "mem {action}, {base}, {offset}"),
        }
    }
}

impl OpCode {
    /// Parses a single op-code statement.
    ///
    /// # Errors
    ///
    /// Returns a [`MetadataError`] for unknown commands, unknown arguments,
    /// or missing/non-numeric pieces.
    pub fn parse(statement: &str) -> Result<Self, MetadataError> {
        let chunks: Vec<&str> = statement.split(',').map(str::trim).collect();
        let mut head = chunks[0].split_whitespace();
        let command = head
            .next()
            .ok_or_else(|| MetadataError::MalformedLine(statement.to_string()))?;
        let arg = head.next().unwrap_or("");

        match command {
            "sys" => match arg {
                "start" => Ok(Self::SysStart),
                "end" => Ok(Self::SysEnd),
                _ => Err(MetadataError::UnknownArgument(statement.to_string())),
            },
            "app" => match arg {
                "start" => Ok(Self::AppStart),
                "end" => Ok(Self::AppEnd),
                _ => Err(MetadataError::UnknownArgument(statement.to_string())),
            },
            "cpu" => {
                if arg != "process" {
                    return Err(MetadataError::UnknownArgument(statement.to_string()));
                }
                let cycles = parse_int(statement, chunks.get(1))?;
                Ok(Self::Cpu { cycles })
            }
            "dev" => {
                let direction = IoDirection::from_code(arg)
                    .ok_or_else(|| MetadataError::UnknownArgument(statement.to_string()))?;
                let device = chunks
                    .get(1)
                    .copied()
                    .and_then(Device::from_code)
                    .ok_or_else(|| MetadataError::UnknownArgument(statement.to_string()))?;
                let cycles = parse_int(statement, chunks.get(2))?;
                Ok(Self::Dev {
                    direction,
                    device,
                    cycles,
                })
            }
            "mem" => {
                let action = MemAction::from_code(arg)
                    .ok_or_else(|| MetadataError::UnknownArgument(statement.to_string()))?;
                let base = parse_int(statement, chunks.get(1))?;
                let offset = parse_int(statement, chunks.get(2))?;
                Ok(Self::Mem {
                    action,
                    base,
                    offset,
                })
            }
            _ => Err(MetadataError::UnknownCommand(statement.to_string())),
        }
    }
}

fn parse_int(statement: &str, chunk: Option<&&str>) -> Result<u32, MetadataError> {
    chunk
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| MetadataError::MalformedLine(statement.to_string()))
}

/// Uploads and validates a metadata program file.
///
/// # Errors
///
/// Returns a [`MetadataError`] when the file cannot be read or the program
/// fails [`parse_program`]'s structural checks.
pub fn load_program(path: impl AsRef<Path>) -> Result<Vec<OpCode>, MetadataError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MetadataError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;
    parse_program(&text)
}

/// Parses metadata program text and validates its structure.
///
/// Bracket lines (`Start Program Meta-Data Code:`,
/// `End Program Meta-Data Code.`) and blank lines are skipped. Statements on
/// one line may be separated by `;`.
///
/// Structural rules: the program begins with `sys start` and ends with
/// `sys end`; `app start`/`app end` pairs balance and never nest; `cpu`,
/// `dev`, and `mem` ops appear only inside an application block.
///
/// # Errors
///
/// Returns a [`MetadataError`] naming the first violated rule.
pub fn parse_program(text: &str) -> Result<Vec<OpCode>, MetadataError> {
    let mut ops = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || is_bracket_line(line) {
            continue;
        }
        for statement in line.split(';') {
            let statement = statement.trim().trim_end_matches('.');
            if statement.is_empty() {
                continue;
            }
            ops.push(OpCode::parse(statement)?);
        }
    }
    validate_structure(&ops)?;
    Ok(ops)
}

/// Renders a program back to its file form, used by the CLI's `-dm` switch.
pub fn render_program(ops: &[OpCode]) -> String {
    let mut out = String::from("Start Program Meta-Data Code:\n");
    for op in ops {
        out.push_str(&op.to_string());
        out.push('\n');
    }
    out.push_str("End Program Meta-Data Code.\n");
    out
}

fn is_bracket_line(line: &str) -> bool {
    line.starts_with("Start Program Meta-Data Code") || line.starts_with("End Program Meta-Data Code")
}

fn validate_structure(ops: &[OpCode]) -> Result<(), MetadataError> {
    if ops.first() != Some(&OpCode::SysStart) {
        return Err(MetadataError::MissingSysStart);
    }
    if ops.last() != Some(&OpCode::SysEnd) {
        return Err(MetadataError::MissingSysEnd);
    }

    let mut in_app = false;
    for op in &ops[1..ops.len() - 1] {
        match op {
            OpCode::SysStart | OpCode::SysEnd => {
                return Err(MetadataError::UnbalancedStartEnd);
            }
            OpCode::AppStart => {
                if in_app {
                    return Err(MetadataError::UnbalancedStartEnd);
                }
                in_app = true;
            }
            OpCode::AppEnd => {
                if !in_app {
                    return Err(MetadataError::UnbalancedStartEnd);
                }
                in_app = false;
            }
            executable => {
                if !in_app {
                    return Err(MetadataError::OpOutsideApp(executable.to_string()));
                }
            }
        }
    }
    if in_app {
        return Err(MetadataError::UnbalancedStartEnd);
    }
    Ok(())
}
