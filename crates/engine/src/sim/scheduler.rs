//! CPU scheduling policies.
//!
//! The scheduler is a small stateful object: besides the configured policy it
//! carries only the last-scheduled pid, which gives SJF-N its stickiness and
//! RR-P its cursor. Selection itself is pure over the current PCB, except
//! that a displaced RUNNING incumbent is demoted back to READY.

use crate::config::{ConfigData, SchedulingPolicy};
use crate::sim::pcb::{Pcb, Pid, ProcessState};

/// Selects the next process to dispatch under the configured policy.
#[derive(Debug)]
pub struct Scheduler {
    policy: SchedulingPolicy,
    last: Option<Pid>,
}

impl Scheduler {
    /// Creates a scheduler for the given policy.
    pub fn new(policy: SchedulingPolicy) -> Self {
        Self { policy, last: None }
    }

    /// The pid returned by the most recent [`next_process`](Self::next_process) call.
    pub fn last_scheduled(&self) -> Option<Pid> {
        self.last
    }

    /// Picks the next process to run.
    ///
    /// Ties break in list order. If the choice differs from the previous
    /// RUNNING process, that process is reset to READY. The chosen process's
    /// cached remaining run time is refreshed before returning.
    ///
    /// `quantum_expired` is consumed by RR-P: the cursor advances only when
    /// the quantum expired or the incumbent is no longer RUNNING.
    ///
    /// Returns `None` only when no process is in a runnable state, which the
    /// driver rules out before calling (interrupts are drained first).
    pub fn next_process(
        &mut self,
        pcb: &mut Pcb,
        config: &ConfigData,
        quantum_expired: &mut bool,
    ) -> Option<Pid> {
        let chosen = match self.policy {
            SchedulingPolicy::FcfsN => pcb
                .iter()
                .find(|p| p.state != ProcessState::Exit)
                .map(|p| p.pid),
            SchedulingPolicy::FcfsP => pcb
                .iter()
                .find(|p| matches!(p.state, ProcessState::Ready | ProcessState::Running))
                .map(|p| p.pid),
            SchedulingPolicy::SjfN => self.pick_shortest_job(pcb, config),
            SchedulingPolicy::SrtfP => pick_shortest_remaining(pcb, config),
            SchedulingPolicy::RrP => self.pick_round_robin(pcb, quantum_expired),
        }?;

        if let Some(prev) = self.last {
            if prev != chosen && pcb[prev].state == ProcessState::Running {
                pcb[prev].state = ProcessState::Ready;
            }
        }
        self.last = Some(chosen);
        pcb[chosen].remaining_ms = pcb[chosen].remaining_run_time(config);
        tracing::trace!(
            policy = %self.policy.as_str(),
            pid = chosen,
            remaining_ms = pcb[chosen].remaining_ms,
            "process selected"
        );
        Some(chosen)
    }

    /// SJF-N: sticky on the incumbent while it is still RUNNING; otherwise
    /// the READY process with the smallest remaining run time.
    fn pick_shortest_job(&self, pcb: &Pcb, config: &ConfigData) -> Option<Pid> {
        if let Some(prev) = self.last {
            if pcb[prev].state == ProcessState::Running {
                return Some(prev);
            }
        }

        let mut shortest: Option<(Pid, u64)> = None;
        for process in pcb.iter() {
            if process.state != ProcessState::Ready {
                continue;
            }
            let remaining = process.remaining_run_time(config);
            if shortest.is_none_or(|(_, best)| remaining < best) {
                shortest = Some((process.pid, remaining));
            }
        }
        shortest.map(|(pid, _)| pid)
    }

    /// RR-P: stay on the incumbent until the quantum expires or it stops
    /// RUNNING, then advance circularly to the next READY or RUNNING process.
    fn pick_round_robin(&mut self, pcb: &Pcb, quantum_expired: &mut bool) -> Option<Pid> {
        let runnable =
            |pid: Pid| matches!(pcb[pid].state, ProcessState::Ready | ProcessState::Running);

        let Some(prev) = self.last else {
            return (0..pcb.len()).find(|&pid| runnable(pid));
        };

        if *quantum_expired || pcb[prev].state != ProcessState::Running {
            *quantum_expired = false;
            let count = pcb.len();
            (1..=count)
                .map(|step| (prev + step) % count)
                .find(|&pid| runnable(pid))
        } else {
            Some(prev)
        }
    }
}

/// SRTF-P: the READY or RUNNING process with the smallest remaining run
/// time, re-evaluated on every call.
fn pick_shortest_remaining(pcb: &Pcb, config: &ConfigData) -> Option<Pid> {
    let mut shortest: Option<(Pid, u64)> = None;
    for process in pcb.iter() {
        if !matches!(process.state, ProcessState::Ready | ProcessState::Running) {
            continue;
        }
        let remaining = process.remaining_run_time(config);
        if shortest.is_none_or(|(_, best)| remaining < best) {
            shortest = Some((process.pid, remaining));
        }
    }
    shortest.map(|(pid, _)| pid)
}
