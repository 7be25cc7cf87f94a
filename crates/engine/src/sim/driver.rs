//! Simulation driver: the top-level orchestration loop.
//!
//! The driver is single-threaded and cooperatively interleaves the simulated
//! processes; the only parallelism is the I/O worker threads spawned for
//! blocking device ops under preemptive policies. Each loop iteration asks
//! the scheduler for a victim, dispatches one op (or one quantum window of a
//! CPU op), updates the memory table and interrupt queue, and emits log
//! lines, strictly in the order the events occur.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::{ConfigData, LogDestination};
use crate::error::SimError;
use crate::metadata::{Device, IoDirection, MemAction, OpCode};
use crate::sim::clock::SimClock;
use crate::sim::interrupt::{self, InterruptQueue};
use crate::sim::journal::{Journal, OpEvent, OsEvent};
use crate::sim::memory::{MemoryOutcome, MemoryRequest, MemoryTable};
use crate::sim::pcb::{Pcb, Pid, ProcessState};
use crate::sim::scheduler::Scheduler;
use crate::stats::SimStats;

/// What a finished run hands back: the full journal and the run counters.
#[derive(Debug)]
pub struct SimReport {
    /// The event journal, including everything flushed to the log file.
    pub journal: Journal,
    /// Run statistics.
    pub stats: SimStats,
}

/// One simulation run: configuration, PCB, scheduler, memory, interrupts,
/// journal, and the I/O worker handles spawned along the way.
#[derive(Debug)]
pub struct Simulation {
    config: ConfigData,
    pcb: Pcb,
    scheduler: Scheduler,
    memory: MemoryTable,
    interrupts: Arc<InterruptQueue>,
    journal: Journal,
    stats: SimStats,
    io_workers: Vec<JoinHandle<()>>,
    quantum_expired: bool,
    has_sys_start: bool,
}

impl Simulation {
    /// Builds a simulation from a validated configuration and op-code
    /// program: PCB construction, interrupt queue sized to the process
    /// count, and an empty journal.
    pub fn new(config: ConfigData, program: &[OpCode]) -> Self {
        let pcb = Pcb::build(program, &config);
        let interrupts = Arc::new(InterruptQueue::new(pcb.len()));
        let scheduler = Scheduler::new(config.sched_policy);
        let memory = MemoryTable::new(config.mem_available);
        let journal = Journal::new(config.log_dest);
        let mut stats = SimStats::default();
        stats.processes_loaded = pcb.len() as u64;
        let has_sys_start = program.first() == Some(&OpCode::SysStart);

        Self {
            config,
            pcb,
            scheduler,
            memory,
            interrupts,
            journal,
            stats,
            io_workers: Vec::new(),
            quantum_expired: false,
            has_sys_start,
        }
    }

    /// Runs the simulation to completion and returns the report.
    ///
    /// A program that does not begin with `sys start` produces an empty
    /// report without simulating anything.
    ///
    /// # Errors
    ///
    /// Only the end-of-run log-file flush can fail; every runtime condition
    /// (including memory faults) is local to a simulated process and shows
    /// up in the journal instead.
    pub fn run(mut self) -> Result<SimReport, SimError> {
        if !self.has_sys_start {
            tracing::warn!("metadata program does not begin with `sys start`; nothing to run");
            return Ok(self.into_report());
        }
        let preemptive = self.config.sched_policy.is_preemptive();

        if self.config.log_dest == LogDestination::File {
            println!("Writing output to file!");
        }
        self.journal.raw("Begin Simulation\n\n");
        self.journal.start_clock();
        self.journal.os_event(OsEvent::SimStart);
        tracing::debug!(
            policy = %self.config.sched_policy,
            processes = self.pcb.len(),
            "simulation started"
        );

        // Admit every process in list order.
        for pid in 0..self.pcb.len() {
            self.journal.os_event(OsEvent::StateChange {
                pid,
                from: self.pcb[pid].state,
                to: ProcessState::Ready,
            });
            self.pcb[pid].state = ProcessState::Ready;
        }

        self.memory_op(0, MemoryRequest::Initialize);

        while !self.pcb.all_exited() {
            if self.pcb.all_blocked() {
                self.idle_until_interrupt();
            }

            let Some(pid) =
                self.scheduler
                    .next_process(&mut self.pcb, &self.config, &mut self.quantum_expired)
            else {
                continue;
            };

            if self.pcb[pid].state == ProcessState::Ready {
                self.journal.os_event(OsEvent::Selected {
                    pid,
                    remaining_ms: self.pcb[pid].remaining_ms,
                });
                self.journal.os_event(OsEvent::StateChange {
                    pid,
                    from: ProcessState::Ready,
                    to: ProcessState::Running,
                });
            }
            self.pcb[pid].state = ProcessState::Running;

            let mut mem_outcome = None;
            if let Some(op) = self.pcb[pid].current_op().copied() {
                match op {
                    OpCode::Cpu { .. } => self.dispatch_cpu(pid, preemptive),
                    OpCode::Dev {
                        direction,
                        device,
                        cycles,
                    } => self.dispatch_dev(pid, direction, device, cycles, preemptive),
                    OpCode::Mem {
                        action,
                        base,
                        offset,
                    } => mem_outcome = Some(self.dispatch_mem(pid, action, base, offset)),
                    // Boundary markers never reach a process's op list.
                    OpCode::SysStart | OpCode::SysEnd | OpCode::AppStart | OpCode::AppEnd => {
                        self.pcb[pid].pop_op();
                    }
                }
            }

            let faulted = mem_outcome.is_some_and(MemoryOutcome::is_failure);
            if !self.pcb[pid].has_ops() || faulted {
                self.journal.blank_line();
                self.journal.os_event(OsEvent::Ended {
                    pid,
                    seg_fault: faulted,
                });
                self.memory_op(pid, MemoryRequest::Deallocate);
                self.journal.os_event(OsEvent::StateChange {
                    pid,
                    from: self.pcb[pid].state,
                    to: ProcessState::Exit,
                });
                self.pcb[pid].state = ProcessState::Exit;
                self.stats.processes_completed += 1;
                if faulted {
                    self.stats.seg_faults += 1;
                }
                tracing::debug!(pid, faulted, "process exited");
            }
        }

        self.journal.os_event(OsEvent::SysStop);
        self.join_io_workers();
        self.memory_op(0, MemoryRequest::Deinitialize);
        self.journal.os_event(OsEvent::SimEnd);
        let _ = self.journal.stop_clock();
        tracing::debug!("simulation finished");

        self.journal.write_to_file(&self.config)?;
        Ok(self.into_report())
    }

    fn into_report(self) -> SimReport {
        SimReport {
            journal: self.journal,
            stats: self.stats,
        }
    }

    /// Dispatches a CPU burst. Under preemption the burst runs cycle by
    /// cycle and stops early when an interrupt arrives or the quantum window
    /// closes; otherwise it runs to completion in one sleep.
    fn dispatch_cpu(&mut self, pid: Pid, preemptive: bool) {
        self.journal.op_event(pid, OpEvent::CpuStart);
        let Some(OpCode::Cpu { cycles }) = self.pcb[pid].current_op().copied() else {
            return;
        };

        if preemptive {
            // A zero quantum would never make progress.
            let quantum = u64::from(self.config.quantum_cycles.max(1));
            let mut cycles_left = cycles;
            let mut executed: u64 = 0;

            while cycles_left > 0 && executed < quantum && !self.interrupts.has_pending() {
                SimClock::wait(self.config.proc_cycle_rate);
                cycles_left -= 1;
                executed += 1;
                self.stats.cpu_cycles += 1;
                self.stats.cpu_ms_simulated += self.config.proc_cycle_rate;
            }
            if let Some(OpCode::Cpu { cycles }) = self.pcb[pid].current_op_mut() {
                *cycles = cycles_left;
            }

            if cycles_left == 0 {
                self.journal.op_event(pid, OpEvent::CpuEnd);
                self.pcb[pid].pop_op();
            } else if let Some(interrupted) = self.interrupts.front() {
                self.journal.op_event(pid, OpEvent::CpuEnd);
                self.journal.blank_line();
                self.service_interrupt(interrupted);
            } else {
                self.journal.blank_line();
                self.journal.os_event(OsEvent::QuantumTimeout { pid });
                self.stats.quantum_expirations += 1;
            }

            if executed == quantum {
                self.quantum_expired = true;
            }
        } else {
            SimClock::wait(self.config.proc_cycle_rate * u64::from(cycles));
            self.stats.cpu_cycles += u64::from(cycles);
            self.stats.cpu_ms_simulated += self.config.proc_cycle_rate * u64::from(cycles);
            self.journal.op_event(pid, OpEvent::CpuEnd);
            self.pcb[pid].pop_op();
        }
    }

    /// Dispatches a device transfer. Under preemption the process blocks and
    /// an I/O worker serves the wait; the op stays at the head of the list
    /// until the interrupt is serviced. Otherwise the wait happens in place.
    fn dispatch_dev(
        &mut self,
        pid: Pid,
        direction: IoDirection,
        device: Device,
        cycles: u32,
        preemptive: bool,
    ) {
        self.journal.op_event(
            pid,
            OpEvent::DevStart {
                device,
                direction,
                blocking: preemptive,
            },
        );
        let duration_ms = self.pcb[pid].io_cycle_ms * u64::from(cycles);
        self.stats.io_ops_dispatched += 1;
        self.stats.io_ms_simulated += duration_ms;

        if preemptive {
            self.journal.os_event(OsEvent::BlockedForIo { pid, direction });
            self.journal.os_event(OsEvent::StateChange {
                pid,
                from: ProcessState::Running,
                to: ProcessState::Blocked,
            });
            self.pcb[pid].state = ProcessState::Blocked;
            let handle = interrupt::spawn_io_worker(Arc::clone(&self.interrupts), pid, duration_ms);
            self.io_workers.push(handle);
            tracing::debug!(pid, duration_ms, "io worker spawned");
        } else {
            SimClock::wait(duration_ms);
            self.journal.op_event(pid, OpEvent::DevEnd { device, direction });
            self.pcb[pid].pop_op();
        }
    }

    /// Dispatches a memory request and logs its result. A failed allocate or
    /// access is fatal to the process; the caller checks the outcome.
    fn dispatch_mem(
        &mut self,
        pid: Pid,
        action: MemAction,
        base: u32,
        offset: u32,
    ) -> MemoryOutcome {
        self.journal.op_event(
            pid,
            OpEvent::MemRequest {
                action,
                base,
                offset,
            },
        );
        let request = match action {
            MemAction::Allocate => MemoryRequest::Allocate { base, offset },
            MemAction::Access => MemoryRequest::Access { base, offset },
        };
        let outcome = self.memory_op(pid, request);
        self.journal.op_event(
            pid,
            OpEvent::MemResult {
                action,
                success: !outcome.is_failure(),
            },
        );
        self.pcb[pid].pop_op();
        outcome
    }

    /// Routes a request through the memory table and emits the memory
    /// display when configured (and logging is not FILE-only).
    fn memory_op(&mut self, pid: Pid, request: MemoryRequest) -> MemoryOutcome {
        let outcome = self.memory.handle(pid, request);
        if self.config.mem_display && self.config.log_dest != LogDestination::File {
            self.journal
                .monitor_only(&self.memory.render_display(outcome));
        }
        outcome
    }

    /// Emits the interrupt lines for `pid`, marks it READY, retires the
    /// device op the interrupt completes, and consumes the queue entry.
    fn service_interrupt(&mut self, pid: Pid) {
        if let Some(OpCode::Dev {
            device, direction, ..
        }) = self.pcb[pid].current_op().copied()
        {
            self.journal.os_event(OsEvent::Interrupted {
                pid,
                device,
                direction,
            });
        }
        self.journal.os_event(OsEvent::StateChange {
            pid,
            from: self.pcb[pid].state,
            to: ProcessState::Ready,
        });
        self.pcb[pid].pop_op();
        self.pcb[pid].state = ProcessState::Ready;
        let _ = self.interrupts.pop();
        self.stats.interrupts_serviced += 1;
        tracing::debug!(pid, "interrupt serviced");
    }

    /// Every active process is blocked: log the idle, park on the interrupt
    /// queue's condition variable, and service the interrupt that ends it.
    fn idle_until_interrupt(&mut self) {
        self.journal.os_event(OsEvent::Idle);
        self.stats.idle_waits += 1;
        let pid = self.interrupts.wait_for_interrupt();
        self.journal.os_event(OsEvent::EndIdle);
        self.service_interrupt(pid);
    }

    /// Joins every spawned I/O worker. All processes are in EXIT by the time
    /// this runs, so every worker has already posted and finished.
    fn join_io_workers(&mut self) {
        for handle in self.io_workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("io worker panicked");
            }
        }
    }
}
