//! Snapshot tree report: every VM's snapshots with age and current-state markers.

use crate::error::VmwareResult;
use crate::property::{get_properties, VimApi};
use crate::types::*;

use chrono::{DateTime, Utc};

/// Levels printed below a root snapshot.
pub const MAX_SNAPSHOT_DEPTH: usize = 3;

/// Snapshots older than this many days get a warning.
pub const DEFAULT_WARNING_AGE_DAYS: i64 = 7;

pub const DEPTH_WARNING: &str =
    "WARNING: Only three levels of snapshots supported, but this Virtual Machine has more.";

pub const CURRENT_MARKER: &str = " : *You are here*";

/// Whole days elapsed since `created`, truncated.
pub fn snapshot_age_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created).num_days()
}

/// `"N days old"`, or the warning form once `days` exceeds `warning_age`.
pub fn age_text(days: i64, warning_age: i64) -> String {
    if days > warning_age {
        format!("!WARNING! Snapshot is {days} days old")
    } else {
        format!("{days} days old")
    }
}

fn line_prefix(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("{}|{} ", "\t".repeat(depth), "-".repeat(depth))
    }
}

/// Render the tree(s) in `info`, one line per snapshot.
pub fn render_snapshot_info(
    info: &VirtualMachineSnapshotInfo,
    now: DateTime<Utc>,
    warning_age: i64,
) -> String {
    let mut out = String::new();
    for root in &info.root_snapshot_list {
        render_node(&mut out, root, 0, info.current_snapshot.as_ref(), now, warning_age);
    }
    out
}

fn render_node(
    out: &mut String,
    node: &VirtualMachineSnapshotTree,
    depth: usize,
    current: Option<&ManagedObjectReference>,
    now: DateTime<Utc>,
    warning_age: i64,
) {
    let age = age_text(snapshot_age_days(node.create_time, now), warning_age);
    let marker = if current == Some(&node.snapshot) { CURRENT_MARKER } else { "" };
    out.push_str(&format!(
        "{}{} : {} : {}{}\n",
        line_prefix(depth),
        node.name,
        node.description,
        age,
        marker
    ));

    if node.child_snapshot_list.is_empty() {
        return;
    }
    if depth == MAX_SNAPSHOT_DEPTH {
        out.push_str(&format!("{}{}\n", "\t".repeat(MAX_SNAPSHOT_DEPTH), DEPTH_WARNING));
        return;
    }
    for child in &node.child_snapshot_list {
        render_node(out, child, depth + 1, current, now, warning_age);
    }
}

/// Fetch `name` + `snapshot` for every VM and render the report.
/// VMs without snapshots are skipped.
pub async fn snapshot_report<A: VimApi + ?Sized>(
    api: &A,
    warning_age: i64,
    now: DateTime<Utc>,
) -> VmwareResult<String> {
    let root = api.root_folder()?;
    let records = get_properties(
        api,
        &root,
        &["VirtualMachine"],
        &["name", "snapshot"],
        "VirtualMachine",
    )
    .await?;

    let mut out = String::new();
    for record in &records {
        let Some(info) = record.get::<VirtualMachineSnapshotInfo>("snapshot")? else {
            continue;
        };
        let name = record.name().unwrap_or(&record.moref().value);
        out.push('\n');
        out.push_str(name);
        out.push('\n');
        out.push_str(&render_snapshot_info(&info, now, warning_age));
    }
    Ok(out)
}
