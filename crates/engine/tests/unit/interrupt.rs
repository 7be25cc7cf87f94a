//! Interrupt queue and I/O worker tests.

use std::sync::Arc;
use std::time::Instant;

use pretty_assertions::assert_eq;

use ossim_core::sim::interrupt::{InterruptQueue, spawn_io_worker};

#[test]
fn queue_starts_empty() {
    let queue = InterruptQueue::new(4);
    assert!(!queue.has_pending());
    assert_eq!(queue.front(), None);
    assert_eq!(queue.pop(), None);
    assert_eq!(queue.capacity(), 4);
}

#[test]
fn entries_come_out_in_fifo_order() {
    let queue = InterruptQueue::new(4);
    queue.post(2);
    queue.post(0);
    queue.post(3);
    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), Some(0));
    assert_eq!(queue.pop(), Some(3));
    assert_eq!(queue.pop(), None);
}

#[test]
fn consumed_entries_form_a_prefix_of_the_enqueue_order() {
    let queue = InterruptQueue::new(4);
    queue.post(1);
    queue.post(2);
    assert_eq!(queue.pop(), Some(1));
    queue.post(3);
    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), Some(3));
}

#[test]
fn front_does_not_consume() {
    let queue = InterruptQueue::new(2);
    queue.post(7);
    assert_eq!(queue.front(), Some(7));
    assert_eq!(queue.front(), Some(7));
    assert!(queue.has_pending());
    assert_eq!(queue.pop(), Some(7));
    assert!(!queue.has_pending());
}

#[test]
fn worker_posts_its_pid_after_the_device_time() {
    let queue = Arc::new(InterruptQueue::new(1));
    let started = Instant::now();
    let worker = spawn_io_worker(Arc::clone(&queue), 5, 10);
    worker.join().expect("worker should finish");
    assert!(started.elapsed().as_millis() >= 10);
    assert_eq!(queue.pop(), Some(5));
}

#[test]
fn workers_from_many_threads_all_land_in_the_queue() {
    let queue = Arc::new(InterruptQueue::new(8));
    let workers: Vec<_> = (0..8)
        .map(|pid| spawn_io_worker(Arc::clone(&queue), pid, 1))
        .collect();
    for worker in workers {
        worker.join().expect("worker should finish");
    }

    let mut drained = Vec::new();
    while let Some(pid) = queue.pop() {
        drained.push(pid);
    }
    drained.sort_unstable();
    assert_eq!(drained, (0..8).collect::<Vec<_>>());
}

#[test]
fn wait_for_interrupt_blocks_until_a_post_arrives() {
    let queue = Arc::new(InterruptQueue::new(1));
    let worker = spawn_io_worker(Arc::clone(&queue), 9, 15);

    let started = Instant::now();
    let pid = queue.wait_for_interrupt();
    assert_eq!(pid, 9);
    assert!(started.elapsed().as_millis() >= 10);

    // The wait peeks; the entry is still there to be consumed.
    assert_eq!(queue.pop(), Some(9));
    worker.join().expect("worker should finish");
}
