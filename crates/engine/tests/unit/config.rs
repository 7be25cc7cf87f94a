//! Configuration upload tests.
//!
//! Covers the `.cnf` grammar, every error class the parser reports, policy
//! and log-to code mapping, and the serde JSON round-trip.

use pretty_assertions::assert_eq;
use rstest::rstest;

use ossim_core::error::ConfigError;
use ossim_core::{ConfigData, LogDestination, SchedulingPolicy};

const CANONICAL: &str = "\
Start Simulator Configuration File
Version/Phase: 1.0
File Path: testfile.mdf
CPU Scheduling Code: RR-P
Quantum Time (cycles): 3
Memory Display (On/Off): On
Memory Available (KB): 102400
Processor Cycle Time (msec): 10
I/O Cycle Time (msec): 20
Log To: Both
Log File Path: logfile.lgf
End Simulator Configuration File.
";

#[test]
fn parses_canonical_file() {
    let config = ConfigData::parse(CANONICAL).expect("canonical config should parse");
    assert_eq!(config.version, 1.0);
    assert_eq!(config.metadata_path, "testfile.mdf");
    assert_eq!(config.sched_policy, SchedulingPolicy::RrP);
    assert_eq!(config.quantum_cycles, 3);
    assert!(config.mem_display);
    assert_eq!(config.mem_available, 102_400);
    assert_eq!(config.proc_cycle_rate, 10);
    assert_eq!(config.io_cycle_rate, 20);
    assert_eq!(config.log_dest, LogDestination::Both);
    assert_eq!(config.log_path, "logfile.lgf");
}

#[test]
fn bracket_lines_and_blanks_are_skipped() {
    let with_blanks = format!("\n\n{CANONICAL}\n");
    assert!(ConfigData::parse(&with_blanks).is_ok());
}

#[rstest]
#[case("FCFS-N", SchedulingPolicy::FcfsN)]
#[case("SJF-N", SchedulingPolicy::SjfN)]
#[case("SRTF-P", SchedulingPolicy::SrtfP)]
#[case("FCFS-P", SchedulingPolicy::FcfsP)]
#[case("RR-P", SchedulingPolicy::RrP)]
fn scheduling_codes_map(#[case] code: &str, #[case] expected: SchedulingPolicy) {
    let text = CANONICAL.replace("RR-P", code);
    let config = ConfigData::parse(&text).expect("config should parse");
    assert_eq!(config.sched_policy, expected);
    assert_eq!(expected.as_str(), code);
}

#[test]
fn scheduling_code_is_case_insensitive() {
    let text = CANONICAL.replace("RR-P", "fcfs-n");
    let config = ConfigData::parse(&text).expect("config should parse");
    assert_eq!(config.sched_policy, SchedulingPolicy::FcfsN);
}

#[rstest]
#[case(SchedulingPolicy::FcfsN, false)]
#[case(SchedulingPolicy::SjfN, false)]
#[case(SchedulingPolicy::SrtfP, true)]
#[case(SchedulingPolicy::FcfsP, true)]
#[case(SchedulingPolicy::RrP, true)]
fn preemptive_classification(#[case] policy: SchedulingPolicy, #[case] preemptive: bool) {
    assert_eq!(policy.is_preemptive(), preemptive);
}

#[rstest]
#[case("Monitor", LogDestination::Monitor, true, false)]
#[case("File", LogDestination::File, false, true)]
#[case("Both", LogDestination::Both, true, true)]
fn log_to_codes_map(
    #[case] code: &str,
    #[case] expected: LogDestination,
    #[case] monitor: bool,
    #[case] file: bool,
) {
    let text = CANONICAL.replace("Log To: Both", &format!("Log To: {code}"));
    let config = ConfigData::parse(&text).expect("config should parse");
    assert_eq!(config.log_dest, expected);
    assert_eq!(expected.to_monitor(), monitor);
    assert_eq!(expected.to_file(), file);
}

#[test]
fn memory_available_out_of_range_is_rejected() {
    let text = CANONICAL.replace("102400", "102401");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::OutOfRange { field: "Memory Available (KB)", .. })
    ));
}

#[test]
fn zero_processor_rate_is_rejected() {
    let text = CANONICAL.replace("Processor Cycle Time (msec): 10", "Processor Cycle Time (msec): 0");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::OutOfRange { field: "Processor Cycle Time (msec)", .. })
    ));
}

#[test]
fn unknown_descriptor_is_rejected() {
    let text = CANONICAL.replace("Log To:", "Log Destination:");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::UnknownDescriptor(_))
    ));
}

#[test]
fn unknown_scheduling_code_is_rejected() {
    let text = CANONICAL.replace("RR-P", "LOTTERY");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::InvalidValue { field: "CPU Scheduling Code", .. })
    ));
}

#[test]
fn non_numeric_quantum_is_rejected() {
    let text = CANONICAL.replace("Quantum Time (cycles): 3", "Quantum Time (cycles): three");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::InvalidValue { field: "Quantum Time (cycles)", .. })
    ));
}

#[test]
fn missing_field_is_reported() {
    let text = CANONICAL.replace("Log File Path: logfile.lgf\n", "");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::MissingField("Log File Path"))
    ));
}

#[test]
fn line_without_colon_is_rejected() {
    let text = CANONICAL.replace("Log To: Both", "Log To Both");
    assert!(matches!(
        ConfigData::parse(&text),
        Err(ConfigError::MalformedLine(_))
    ));
}

#[test]
fn json_round_trip_preserves_config() {
    let config = ConfigData::parse(CANONICAL).expect("config should parse");
    let json = serde_json::to_string(&config).expect("config should serialize");
    let reparsed: ConfigData = serde_json::from_str(&json).expect("config should deserialize");
    assert_eq!(config, reparsed);
}

#[test]
fn policy_serializes_as_config_code() {
    let json = serde_json::to_string(&SchedulingPolicy::SrtfP).expect("policy should serialize");
    assert_eq!(json, "\"SRTF-P\"");
}

#[test]
fn display_dump_lists_every_field() {
    let config = ConfigData::parse(CANONICAL).expect("config should parse");
    let dump = config.to_string();
    assert!(dump.contains("Config File Display"));
    assert!(dump.contains("CPU schedule selection : RR-P"));
    assert!(dump.contains("Memory available       : 102400"));
    assert!(dump.contains("Log file name          : logfile.lgf"));
}
