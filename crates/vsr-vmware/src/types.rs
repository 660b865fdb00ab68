//! Shared types for vSphere VI/JSON reporting.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection / Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Top-level configuration for connecting to a vCenter / ESXi host.
#[derive(Debug, Clone)]
pub struct VsphereConfig {
    /// vCenter or ESXi hostname / IP (e.g. "vcenter.lab.local")
    pub host: String,
    /// Port (default 443)
    pub port: u16,
    /// Username (e.g. "administrator@vsphere.local")
    pub username: String,
    /// Password
    pub password: SecretString,
    /// Skip TLS certificate verification (self-signed labs)
    pub insecure: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// VI/JSON release segment of the base path (e.g. "8.0.1.0")
    pub api_release: String,
}

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";

impl Default for VsphereConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: SecretString::new(String::new()),
            port: DEFAULT_PORT,
            insecure: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_release: DEFAULT_API_RELEASE.to_string(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Managed objects
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opaque handle to a server-side managed object (e.g. `VirtualMachine:vm-42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ManagedObjectReference {
    #[serde(rename = "type")]
    pub mo_type: String,
    pub value: String,
}

impl ManagedObjectReference {
    pub fn new(mo_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self { mo_type: mo_type.into(), value: value.into() }
    }
}

impl Serialize for ManagedObjectReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ManagedObjectReference", 3)?;
        s.serialize_field("_typeName", "ManagedObjectReference")?;
        s.serialize_field("type", &self.mo_type)?;
        s.serialize_field("value", &self.value)?;
        s.end()
    }
}

impl std::fmt::Display for ManagedObjectReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.mo_type, self.value)
    }
}

/// Root object references returned by `ServiceInstance.content`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub root_folder: ManagedObjectReference,
    pub property_collector: ManagedObjectReference,
    pub view_manager: ManagedObjectReference,
    pub session_manager: ManagedObjectReference,
    #[serde(default)]
    pub about: Option<AboutInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Body of a successful `SessionManager.Login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(default)]
    pub user_name: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Property collector
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalSpec {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    pub name: String,
    #[serde(rename = "type")]
    pub mo_type: String,
    pub path: String,
    pub skip: bool,
}

impl TraversalSpec {
    pub fn new(name: &str, mo_type: &str, path: &str) -> Self {
        Self {
            type_name: "TraversalSpec",
            name: name.to_string(),
            mo_type: mo_type.to_string(),
            path: path.to_string(),
            skip: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    pub obj: ManagedObjectReference,
    pub skip: bool,
    pub select_set: Vec<TraversalSpec>,
}

impl ObjectSpec {
    pub fn new(obj: ManagedObjectReference, select_set: Vec<TraversalSpec>) -> Self {
        Self { type_name: "ObjectSpec", obj, skip: false, select_set }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySpec {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    #[serde(rename = "type")]
    pub mo_type: String,
    pub all: bool,
    pub path_set: Vec<String>,
}

impl PropertySpec {
    pub fn new(mo_type: &str, path_set: &[&str]) -> Self {
        Self {
            type_name: "PropertySpec",
            mo_type: mo_type.to_string(),
            all: false,
            path_set: path_set.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilterSpec {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
    pub object_set: Vec<ObjectSpec>,
    pub prop_set: Vec<PropertySpec>,
    pub report_missing_objects_in_results: bool,
}

impl PropertyFilterSpec {
    pub fn new(object_set: Vec<ObjectSpec>, prop_set: Vec<PropertySpec>) -> Self {
        Self {
            type_name: "PropertyFilterSpec",
            object_set,
            prop_set,
            report_missing_objects_in_results: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveOptions {
    #[serde(rename = "_typeName")]
    type_name: &'static str,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self { type_name: "RetrieveOptions" }
    }
}

/// One page of `RetrievePropertiesEx` / `ContinueRetrievePropertiesEx`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResult {
    #[serde(default)]
    pub objects: Vec<ObjectContent>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    pub obj: ManagedObjectReference,
    #[serde(default)]
    pub prop_set: Vec<DynamicProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DynamicProperty {
    pub name: String,
    #[serde(default)]
    pub val: serde_json::Value,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Snapshots
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Value of a VM's `snapshot` property.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSnapshotInfo {
    #[serde(default)]
    pub current_snapshot: Option<ManagedObjectReference>,
    #[serde(default)]
    pub root_snapshot_list: Vec<VirtualMachineSnapshotTree>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSnapshotTree {
    pub snapshot: ManagedObjectReference,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub create_time: DateTime<Utc>,
    #[serde(default)]
    pub child_snapshot_list: Vec<VirtualMachineSnapshotTree>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Virtual hardware
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Element of `config.hardware.device`. Only the fields the hardware
/// report reads are modelled; disks and NICs share the struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualDevice {
    pub key: i32,
    #[serde(default)]
    pub device_info: Option<Description>,
    #[serde(default)]
    pub backing: Option<DeviceBacking>,
    #[serde(rename = "capacityInKB", default)]
    pub capacity_in_kb: Option<i64>,
    #[serde(default)]
    pub mac_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBacking {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub thin_provisioned: Option<bool>,
}
