use async_trait::async_trait;
use chrono::Utc;
use vsr_vmware::hardware::hardware_report;
use vsr_vmware::snapshot::snapshot_report;
use vsr_vmware::{VimApi, VmwareResult};

/// A report produced from one authenticated session.
#[async_trait]
pub trait Report: Send + Sync {
    async fn run(&self, api: &dyn VimApi) -> VmwareResult<String>;
}

/// Snapshot trees of every VM that has snapshots.
pub struct SnapshotReport {
    pub warning_age_days: i64,
}

#[async_trait]
impl Report for SnapshotReport {
    async fn run(&self, api: &dyn VimApi) -> VmwareResult<String> {
        snapshot_report(api, self.warning_age_days, Utc::now()).await
    }
}

/// Disks and NICs of the named VMs.
pub struct HardwareReport {
    pub vm_names: Vec<String>,
}

#[async_trait]
impl Report for HardwareReport {
    async fn run(&self, api: &dyn VimApi) -> VmwareResult<String> {
        hardware_report(api, &self.vm_names).await
    }
}
