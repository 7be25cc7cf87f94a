//! Interrupt queue and simulated I/O workers.
//!
//! Under preemptive policies every `dev` op blocks its process and hands the
//! wait to a background worker thread. The worker's only interaction with
//! the driver is a single append to this queue once the device time has
//! elapsed; the driver consumes entries from the front, preserving FIFO
//! order. The condition variable replaces the busy-wait a sentinel array
//! would need when every active process is blocked.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::sim::clock::SimClock;
use crate::sim::pcb::Pid;

/// Bounded FIFO of pids whose simulated I/O has completed.
///
/// Capacity equals the process count: a process has at most one device op in
/// flight, so the queue can never hold duplicates.
#[derive(Debug)]
pub struct InterruptQueue {
    pending: Mutex<VecDeque<Pid>>,
    ready: Condvar,
    capacity: usize,
}

impl InterruptQueue {
    /// Creates a queue sized to the process count.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::with_capacity(capacity)),
            ready: Condvar::new(),
            capacity,
        }
    }

    /// Appends a completed process id. Called from I/O worker threads.
    pub fn post(&self, pid: Pid) {
        let mut pending = self.pending.lock().expect("interrupt queue lock poisoned");
        debug_assert!(pending.len() < self.capacity, "interrupt queue overflow");
        pending.push_back(pid);
        tracing::trace!(pid, "io interrupt queued");
        self.ready.notify_one();
    }

    /// The pid at the front of the queue, without consuming it.
    pub fn front(&self) -> Option<Pid> {
        self.pending
            .lock()
            .expect("interrupt queue lock poisoned")
            .front()
            .copied()
    }

    /// Whether any interrupt is waiting to be serviced.
    pub fn has_pending(&self) -> bool {
        !self
            .pending
            .lock()
            .expect("interrupt queue lock poisoned")
            .is_empty()
    }

    /// Consumes the front entry.
    pub fn pop(&self) -> Option<Pid> {
        self.pending
            .lock()
            .expect("interrupt queue lock poisoned")
            .pop_front()
    }

    /// Blocks until the queue is non-empty and returns the front pid without
    /// consuming it. Used by the driver when every active process is blocked.
    pub fn wait_for_interrupt(&self) -> Pid {
        let mut pending = self.pending.lock().expect("interrupt queue lock poisoned");
        while pending.is_empty() {
            pending = self
                .ready
                .wait(pending)
                .expect("interrupt queue lock poisoned");
        }
        pending[0]
    }

    /// Maximum number of simultaneously queued interrupts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Spawns a worker that waits out one device transfer and then posts the
/// owning pid to the interrupt queue.
///
/// Workers never log; the driver emits the interrupt lines when it services
/// the queue, which keeps the event log totally ordered.
pub fn spawn_io_worker(
    queue: Arc<InterruptQueue>,
    pid: Pid,
    duration_ms: u64,
) -> JoinHandle<()> {
    thread::spawn(move || {
        SimClock::wait(duration_ms);
        queue.post(pid);
    })
}
