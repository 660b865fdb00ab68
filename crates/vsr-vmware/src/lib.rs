//! # vsphere-reports – VMware / vSphere access
//!
//! Read-only reporting against vCenter / ESXi via the vSphere VI/JSON API.
//!
//! ## Modules
//!
//! - **types** - Managed object references, service content, property
//!   collector specs, snapshot and device data objects
//! - **error** - Crate-specific error types
//! - **vsphere** - VI/JSON HTTP client with session-based auth
//! - **property** - Paginated property collection through a container view
//! - **snapshot** - Snapshot tree report
//! - **hardware** - Virtual disk / NIC report

pub mod types;
pub mod error;
pub mod vsphere;
pub mod property;
pub mod snapshot;
pub mod hardware;

pub use error::{VmwareError, VmwareErrorKind, VmwareResult};
pub use property::{get_properties, PropertyRecord, VimApi};
pub use vsphere::VsphereClient;
