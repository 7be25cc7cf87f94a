//! PCB construction and process bookkeeping tests.

use pretty_assertions::assert_eq;

use ossim_core::SchedulingPolicy;
use ossim_core::metadata::OpCode;
use ossim_core::sim::pcb::{Pcb, ProcessState};

use crate::common::{parse, test_config};

const TWO_APPS: &str = "\
sys start
app start
cpu process, 5
dev in, keyboard, 3
app end
app start
mem allocate, 0, 10
app end
sys end
";

#[test]
fn builder_assigns_pids_in_encounter_order() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert_eq!(pcb.len(), 2);
    assert_eq!(pcb[0].pid, 0);
    assert_eq!(pcb[1].pid, 1);
}

#[test]
fn builder_initializes_processes_as_new() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert!(pcb.iter().all(|p| p.state == ProcessState::New));
}

#[test]
fn boundary_markers_are_not_copied_into_op_lists() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let pcb = Pcb::build(&parse(TWO_APPS), &config);
    let ops: Vec<OpCode> = pcb[0].ops().copied().collect();
    assert_eq!(ops.len(), 2);
    assert!(matches!(ops[0], OpCode::Cpu { cycles: 5 }));
    assert!(matches!(ops[1], OpCode::Dev { cycles: 3, .. }));
}

#[test]
fn io_cycle_rate_is_cached_on_each_process() {
    let mut config = test_config(SchedulingPolicy::FcfsN);
    config.io_cycle_rate = 20;
    let pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert!(pcb.iter().all(|p| p.io_cycle_ms == 20));
}

#[test]
fn remaining_run_time_sums_cpu_and_io_cycles() {
    // 5 cpu cycles at 10 ms plus 3 io cycles at 20 ms.
    let mut config = test_config(SchedulingPolicy::FcfsN);
    config.proc_cycle_rate = 10;
    config.io_cycle_rate = 20;
    let pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert_eq!(pcb[0].remaining_run_time(&config), 110);
}

#[test]
fn remaining_run_time_ignores_memory_ops() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert_eq!(pcb[1].remaining_run_time(&config), 0);
}

#[test]
fn popping_ops_empties_the_list() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let mut pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert!(pcb[0].has_ops());
    pcb[0].pop_op();
    pcb[0].pop_op();
    assert!(!pcb[0].has_ops());
    assert_eq!(pcb[0].current_op(), None);
}

#[test]
fn sys_only_program_builds_an_empty_pcb() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let pcb = Pcb::build(&parse("sys start\nsys end"), &config);
    assert!(pcb.is_empty());
    assert!(pcb.all_exited());
}

#[test]
fn all_exited_tracks_states() {
    let config = test_config(SchedulingPolicy::FcfsN);
    let mut pcb = Pcb::build(&parse(TWO_APPS), &config);
    assert!(!pcb.all_exited());
    pcb[0].state = ProcessState::Exit;
    pcb[1].state = ProcessState::Exit;
    assert!(pcb.all_exited());
}

#[test]
fn all_blocked_ignores_exited_processes() {
    let config = test_config(SchedulingPolicy::FcfsP);
    let mut pcb = Pcb::build(&parse(TWO_APPS), &config);
    pcb[0].state = ProcessState::Blocked;
    pcb[1].state = ProcessState::Exit;
    assert!(pcb.all_blocked());
    pcb[1].state = ProcessState::Ready;
    assert!(!pcb.all_blocked());
}
