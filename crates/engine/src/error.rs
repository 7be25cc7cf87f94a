//! Error types for the simulator.
//!
//! Parse failures (configuration or metadata upload) are fatal to a run and
//! surface as `Err` values. Simulated memory faults are not errors at this
//! level: they terminate the offending simulated process and appear in the
//! event log as segmentation-fault lines while the simulation continues.

use thiserror::Error;

/// Errors produced while uploading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read at all.
    #[error("cannot read configuration file `{path}`: {source}")]
    FileAccess {
        /// Path as given on the command line.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line did not have the `Descriptor: value` shape.
    #[error("malformed configuration line `{0}`")]
    MalformedLine(String),

    /// The descriptor on the left of the colon is not one we know.
    #[error("unrecognised configuration descriptor `{0}`")]
    UnknownDescriptor(String),

    /// The value could not be parsed as the expected type.
    #[error("invalid value `{value}` for `{field}`")]
    InvalidValue {
        /// Configuration field being parsed.
        field: &'static str,
        /// Offending value text.
        value: String,
    },

    /// The value parsed but lies outside the accepted range.
    #[error("value `{value}` for `{field}` is out of range ({range})")]
    OutOfRange {
        /// Configuration field being parsed.
        field: &'static str,
        /// Offending value text.
        value: String,
        /// Human-readable accepted range.
        range: &'static str,
    },

    /// A required configuration line never appeared.
    #[error("configuration is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Errors produced while uploading a metadata op-code program.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata file could not be read at all.
    #[error("cannot read metadata file `{path}`: {source}")]
    FileAccess {
        /// Path taken from the configuration's `File Path` line.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The program does not begin with `sys start`.
    #[error("metadata program must begin with `sys start`")]
    MissingSysStart,

    /// The program does not end with `sys end`.
    #[error("metadata program must end with `sys end`")]
    MissingSysEnd,

    /// `app start`/`app end` (or `sys start`/`sys end`) pairs do not balance.
    #[error("unbalanced start/end pairs in metadata program")]
    UnbalancedStartEnd,

    /// The three-letter command is not one of `sys`, `app`, `cpu`, `dev`, `mem`.
    #[error("unrecognised op command in `{0}`")]
    UnknownCommand(String),

    /// A command argument (device, direction, action) is not a legal value.
    #[error("unrecognised op argument in `{0}`")]
    UnknownArgument(String),

    /// A `cpu`, `dev`, or `mem` op appeared outside an application block.
    #[error("op command `{0}` outside of an application block")]
    OpOutsideApp(String),

    /// The line is missing pieces or carries a non-numeric argument.
    #[error("malformed op code line `{0}`")]
    MalformedLine(String),
}

/// Top-level simulator error.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration upload failed.
    #[error("config upload error: {0}")]
    Config(#[from] ConfigError),

    /// Metadata upload failed.
    #[error("metadata upload error: {0}")]
    Metadata(#[from] MetadataError),

    /// Writing the log file at shutdown failed.
    #[error("log file write error: {0}")]
    LogWrite(#[from] std::io::Error),
}
