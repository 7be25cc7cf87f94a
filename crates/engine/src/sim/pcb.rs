//! Process control blocks.
//!
//! The PCB builder walks the flat op-code stream and cuts it into processes:
//! each `app start` opens a process that owns a copy of the ops up to the
//! matching `app end`. Pids are assigned monotonically from 0 in encounter
//! order, so a pid doubles as an index into the PCB.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::config::ConfigData;
use crate::metadata::OpCode;

/// Simulated process identifier; doubles as the PCB index.
pub type Pid = usize;

/// Lifecycle state of a simulated process.
///
/// `NEW → READY → RUNNING ↔ BLOCKED → EXIT`, with `RUNNING → READY` on
/// preemption. `BLOCKED` is reachable only under preemptive policies, while
/// a device op is in flight. `EXIT` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Built by the PCB builder, not yet admitted.
    New,
    /// Admitted and runnable.
    Ready,
    /// Currently dispatched on the simulated CPU.
    Running,
    /// Waiting on a simulated device transfer.
    Blocked,
    /// Finished, by op exhaustion or memory fault.
    Exit,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::New => "NEW",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Blocked => "BLOCKED",
            Self::Exit => "EXIT",
        })
    }
}

/// One process record: its state and the op codes it still has to run.
#[derive(Debug)]
pub struct Process {
    /// Process identifier, 0-based in encounter order.
    pub pid: Pid,
    /// Current lifecycle state.
    pub state: ProcessState,
    /// Cached remaining run time in ms; refreshed by the scheduler, derived
    /// from the remaining ops rather than authoritative.
    pub remaining_ms: u64,
    /// Cached I/O cycle rate in ms, used to size device waits and workers.
    pub io_cycle_ms: u64,
    ops: VecDeque<OpCode>,
}

impl Process {
    fn new(pid: Pid, io_cycle_ms: u64) -> Self {
        Self {
            pid,
            state: ProcessState::New,
            remaining_ms: 0,
            io_cycle_ms,
            ops: VecDeque::new(),
        }
    }

    /// The op at the head of the remaining stream, if any.
    pub fn current_op(&self) -> Option<&OpCode> {
        self.ops.front()
    }

    /// Mutable head op, for decrementing CPU cycles in place.
    pub fn current_op_mut(&mut self) -> Option<&mut OpCode> {
        self.ops.front_mut()
    }

    /// Discards the head op.
    pub fn pop_op(&mut self) -> Option<OpCode> {
        self.ops.pop_front()
    }

    /// Whether any ops remain.
    pub fn has_ops(&self) -> bool {
        !self.ops.is_empty()
    }

    /// Remaining ops, head first.
    pub fn ops(&self) -> impl Iterator<Item = &OpCode> {
        self.ops.iter()
    }

    /// Recomputes the remaining run time: processor rate times remaining CPU
    /// cycles plus I/O rate times remaining device cycles.
    pub fn remaining_run_time(&self, config: &ConfigData) -> u64 {
        self.ops
            .iter()
            .map(|op| match op {
                OpCode::Cpu { cycles } => config.proc_cycle_rate * u64::from(*cycles),
                OpCode::Dev { cycles, .. } => config.io_cycle_rate * u64::from(*cycles),
                _ => 0,
            })
            .sum()
    }
}

/// The process control block list for one simulation run.
#[derive(Debug, Default)]
pub struct Pcb {
    processes: Vec<Process>,
}

impl Pcb {
    /// Builds the PCB from a validated op-code stream.
    ///
    /// Boundary markers (`sys`/`app` start and end) are consumed but never
    /// copied into a process's op list; every process starts in `NEW`.
    pub fn build(program: &[OpCode], config: &ConfigData) -> Self {
        let mut processes: Vec<Process> = Vec::new();
        let mut current: Option<Process> = None;

        for op in program {
            match op {
                OpCode::AppStart => {
                    current = Some(Process::new(processes.len(), config.io_cycle_rate));
                }
                OpCode::AppEnd => {
                    if let Some(process) = current.take() {
                        processes.push(process);
                    }
                }
                OpCode::SysStart | OpCode::SysEnd => {}
                executable => {
                    if let Some(process) = current.as_mut() {
                        process.ops.push_back(*executable);
                    }
                }
            }
        }

        Self { processes }
    }

    /// Number of processes loaded.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether the PCB holds no processes at all.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Iterates the processes in pid order.
    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    /// Whether every process has reached `EXIT`.
    pub fn all_exited(&self) -> bool {
        self.processes
            .iter()
            .all(|p| p.state == ProcessState::Exit)
    }

    /// Whether every process that has not exited is blocked on I/O.
    pub fn all_blocked(&self) -> bool {
        self.processes
            .iter()
            .all(|p| matches!(p.state, ProcessState::Blocked | ProcessState::Exit))
    }
}

impl Index<Pid> for Pcb {
    type Output = Process;

    fn index(&self, pid: Pid) -> &Process {
        &self.processes[pid]
    }
}

impl IndexMut<Pid> for Pcb {
    fn index_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.processes[pid]
    }
}
