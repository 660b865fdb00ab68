//! Shared plumbing for the `snaplist` and `vmhardware` binaries: argument
//! groups, logging, the session scope and exit-code mapping.

pub mod cli;
pub mod reports;
pub mod runner;

pub use cli::{ConnectionArgs, OutputArgs};
pub use reports::{HardwareReport, Report, SnapshotReport};
pub use runner::{failure_message, run, run_in_session, run_until_shutdown, EXIT_FAILURE};
