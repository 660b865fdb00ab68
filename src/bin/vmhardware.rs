//! vmhardware: virtual disks and network interfaces of named VMs.

use clap::Parser;
use std::process::ExitCode;
use vsphere_reports::{run, ConnectionArgs, HardwareReport, OutputArgs};

/// Print the .vmx path, virtual disks and vNICs of one or more VMs.
#[derive(Debug, Parser)]
#[command(name = "vmhardware", version, about)]
struct Args {
    #[command(flatten)]
    conn: ConnectionArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Virtual machine to report on (repeat for several)
    #[arg(short = 'm', long = "vm", value_name = "NAME", required = true)]
    vms: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let report = HardwareReport { vm_names: args.vms };
    run(&args.conn, &report).await
}
