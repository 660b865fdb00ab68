//! snaplist: snapshot report for every virtual machine, up to three levels
//! below each root snapshot.

use clap::Parser;
use std::process::ExitCode;
use vsphere_reports::{run, ConnectionArgs, OutputArgs, SnapshotReport};
use vsr_vmware::snapshot::DEFAULT_WARNING_AGE_DAYS;

/// Print the snapshot tree, age and current position of every VM.
#[derive(Debug, Parser)]
#[command(name = "snaplist", version, about)]
struct Args {
    #[command(flatten)]
    conn: ConnectionArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Flag snapshots older than this many days
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_WARNING_AGE_DAYS)]
    warning_age: i64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let report = SnapshotReport { warning_age_days: args.warning_age };
    run(&args.conn, &report).await
}
