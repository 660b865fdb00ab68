//! Virtual disk / NIC report for named VMs.

use crate::error::VmwareResult;
use crate::property::{get_properties, VimApi};
use crate::types::*;

use std::ops::Range;

/// Device keys the platform assigns to virtual disks.
pub const DISK_KEY_RANGE: Range<i32> = 2000..3000;
/// Device keys the platform assigns to network adapters.
pub const NIC_KEY_RANGE: Range<i32> = 4000..5000;

const LABEL_WIDTH: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Disk,
    NetworkInterface,
    Other,
}

pub fn classify(key: i32) -> DeviceClass {
    if DISK_KEY_RANGE.contains(&key) {
        DeviceClass::Disk
    } else if NIC_KEY_RANGE.contains(&key) {
        DeviceClass::NetworkInterface
    } else {
        DeviceClass::Other
    }
}

fn label(device: &VirtualDevice) -> &str {
    device.device_info.as_ref().map(|d| d.label.as_str()).unwrap_or_default()
}

/// `label | 16.0GB | [ds] path.vmdk | Thin: true`
pub fn disk_line(device: &VirtualDevice) -> String {
    let gb = device.capacity_in_kb.unwrap_or(0) as f64 / 1024.0 / 1024.0;
    let backing = device.backing.as_ref();
    let file = backing.and_then(|b| b.file_name.as_deref()).unwrap_or_default();
    let thin = match backing.and_then(|b| b.thin_provisioned) {
        Some(true) => "true",
        Some(false) => "false",
        None => "n/a",
    };
    format!("{} | {gb:.1}GB | {file} | Thin: {thin}", label(device))
}

/// `label | summary | mac`
pub fn nic_line(device: &VirtualDevice) -> String {
    let summary = device.device_info.as_ref().map(|d| d.summary.as_str()).unwrap_or_default();
    let mac = device.mac_address.as_deref().unwrap_or_default();
    format!("{} | {summary} | {mac}", label(device))
}

fn push_section(out: &mut String, title: &str, lines: &[String]) {
    let mut iter = lines.iter();
    let first = iter.next().map(String::as_str).unwrap_or("(none)");
    out.push_str(&format!("{title:<width$}: {first}\n", width = LABEL_WIDTH));
    for line in iter {
        out.push_str(&format!("{:width$}{line}\n", "", width = LABEL_WIDTH + 2));
    }
}

/// Render the `.vmx` path followed by disks and NICs, first entry inline.
pub fn render_vm_hardware(vmx_path: &str, devices: &[VirtualDevice]) -> String {
    let mut disks = Vec::new();
    let mut nics = Vec::new();
    for device in devices {
        match classify(device.key) {
            DeviceClass::Disk => disks.push(disk_line(device)),
            DeviceClass::NetworkInterface => nics.push(nic_line(device)),
            DeviceClass::Other => {}
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{:<width$}: {vmx_path}\n", "VM .vmx Path", width = LABEL_WIDTH));
    push_section(&mut out, "Virtual Disks", &disks);
    push_section(&mut out, "Virtual NIC(s)", &nics);
    out
}

pub fn unavailable_message(vm_name: &str) -> String {
    format!("ERROR: Problem connecting to Virtual Machine.  {vm_name} is likely powered off or suspended")
}

/// Fetch hardware for every VM and render the ones named in `vm_names`,
/// in the order given. A name shared by several VMs renders each of them in
/// fetch order. Names that are missing, or whose configuration the server did
/// not return, get an error line instead.
pub async fn hardware_report<A: VimApi + ?Sized>(api: &A, vm_names: &[String]) -> VmwareResult<String> {
    let root = api.root_folder()?;
    let records = get_properties(
        api,
        &root,
        &["VirtualMachine"],
        &["name", "config.hardware.device", "summary.config.vmPathName"],
        "VirtualMachine",
    )
    .await?;

    let mut out = String::new();
    for wanted in vm_names {
        let mut matches = records
            .iter()
            .filter(|r| r.name() == Some(wanted.as_str()))
            .peekable();
        if matches.peek().is_none() {
            log::debug!("{wanted} not among {} fetched VMs", records.len());
            out.push('\n');
            out.push_str(&unavailable_message(wanted));
            out.push('\n');
            continue;
        }

        for record in matches {
            out.push('\n');
            let Some(devices) = record.get::<Vec<VirtualDevice>>("config.hardware.device")? else {
                log::debug!("{} returned no hardware configuration", record.moref());
                out.push_str(&unavailable_message(wanted));
                out.push('\n');
                continue;
            };
            let vmx_path = record
                .get::<String>("summary.config.vmPathName")?
                .unwrap_or_default();

            out.push_str(wanted);
            out.push('\n');
            out.push_str(&render_vm_hardware(&vmx_path, &devices));
        }
    }
    Ok(out)
}
