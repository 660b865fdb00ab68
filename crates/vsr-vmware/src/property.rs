//! Paginated property collection through a temporary container view.

use crate::error::{VmwareError, VmwareResult};
use crate::types::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Managed object type of the temporary view the fetcher traverses.
pub const CONTAINER_VIEW: &str = "ContainerView";

/// The slice of the vim25 API the reports need.
#[async_trait]
pub trait VimApi: Send + Sync {
    /// `ServiceContent.rootFolder` of the connected endpoint.
    fn root_folder(&self) -> VmwareResult<ManagedObjectReference>;

    /// ViewManager.CreateContainerView
    async fn create_container_view(
        &self,
        container: &ManagedObjectReference,
        view_types: &[&str],
        recursive: bool,
    ) -> VmwareResult<ManagedObjectReference>;

    /// View.DestroyView
    async fn destroy_view(&self, view: &ManagedObjectReference) -> VmwareResult<()>;

    /// PropertyCollector.RetrievePropertiesEx; an empty result is an empty page.
    async fn retrieve_properties_ex(
        &self,
        spec_set: &[PropertyFilterSpec],
        options: &RetrieveOptions,
    ) -> VmwareResult<RetrieveResult>;

    /// PropertyCollector.ContinueRetrievePropertiesEx
    async fn continue_retrieve_properties_ex(&self, token: &str) -> VmwareResult<RetrieveResult>;
}

/// Requested properties of one managed object, plus its reference.
#[derive(Debug, Clone)]
pub struct PropertyRecord {
    obj: ManagedObjectReference,
    props: HashMap<String, Value>,
}

impl PropertyRecord {
    /// Reference to the object the properties were read from.
    pub fn moref(&self) -> &ManagedObjectReference {
        &self.obj
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Raw JSON value of a property with any VI/JSON `_value` wrapper removed.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.props.get(name).map(unwrap_any)
    }

    /// Typed value of a property. `Ok(None)` if the server did not return it.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> VmwareResult<Option<T>> {
        match self.raw(name) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => T::deserialize(v)
                .map(Some)
                .map_err(|e| VmwareError::parse(format!("Property '{name}' of {}: {e}", self.obj))),
        }
    }

    /// Convenience for the `name` property every report fetches.
    pub fn name(&self) -> Option<&str> {
        self.raw("name").and_then(Value::as_str)
    }
}

impl From<ObjectContent> for PropertyRecord {
    fn from(oc: ObjectContent) -> Self {
        let props = oc.prop_set.into_iter().map(|p| (p.name, p.val)).collect();
        Self { obj: oc.obj, props }
    }
}

/// Strip the `{"_typeName": "...", "_value": ...}` envelope VI/JSON puts
/// around values in `xsd:anyType` positions.
fn unwrap_any(v: &Value) -> &Value {
    match v.get("_value") {
        Some(inner) if v.get("_typeName").is_some() => inner,
        _ => v,
    }
}

/// Fetch `props` for every object of `view_types` below `container`.
///
/// Follows continuation tokens until the collector reports no more pages;
/// records come back in server order. The temporary view is destroyed
/// before returning, whether or not retrieval succeeded.
pub async fn get_properties<A: VimApi + ?Sized>(
    api: &A,
    container: &ManagedObjectReference,
    view_types: &[&str],
    props: &[&str],
    spec_type: &str,
) -> VmwareResult<Vec<PropertyRecord>> {
    let view = api.create_container_view(container, view_types, true).await?;
    log::debug!("Created {view} over {container} for {view_types:?}");

    let collected = collect_pages(api, &view, props, spec_type).await;

    if let Err(e) = api.destroy_view(&view).await {
        log::warn!("Failed to destroy {view}: {e}");
    }

    let objects = collected?;
    Ok(objects.into_iter().map(PropertyRecord::from).collect())
}

async fn collect_pages<A: VimApi + ?Sized>(
    api: &A,
    view: &ManagedObjectReference,
    props: &[&str],
    spec_type: &str,
) -> VmwareResult<Vec<ObjectContent>> {
    let traversal = TraversalSpec::new("tSpecName", CONTAINER_VIEW, "view");
    let filter = PropertyFilterSpec::new(
        vec![ObjectSpec::new(view.clone(), vec![traversal])],
        vec![PropertySpec::new(spec_type, props)],
    );

    let mut page = api
        .retrieve_properties_ex(std::slice::from_ref(&filter), &RetrieveOptions::default())
        .await?;
    let mut objects = std::mem::take(&mut page.objects);
    let mut pages = 1;

    while let Some(token) = page.token.take() {
        page = api.continue_retrieve_properties_ex(&token).await?;
        objects.append(&mut page.objects);
        pages += 1;
    }

    log::debug!("Retrieved {} objects in {pages} page(s)", objects.len());
    Ok(objects)
}


#[cfg(test)]
mod tests {
    use super::fake::{vm, FakeApi};
    use super::*;
    use serde_json::json;

    fn root() -> ManagedObjectReference {
        ManagedObjectReference::new("Folder", "group-d1")
    }

    fn ids(records: &[PropertyRecord]) -> Vec<String> {
        records.iter().map(|r| r.moref().value.clone()).collect()
    }

    #[tokio::test]
    async fn single_page_without_token() {
        let api = FakeApi::single_page(vec![vm("vm-1", &[]), vm("vm-2", &[])]);
        let records = get_properties(&api, &root(), &["VirtualMachine"], &["name"], "VirtualMachine")
            .await
            .unwrap();
        assert_eq!(ids(&records), vec!["vm-1", "vm-2"]);
        assert_eq!(
            api.calls(),
            vec![
                "create Folder:group-d1 [\"VirtualMachine\"] true",
                "retrieve name",
                "destroy ContainerView:session[1]view-1",
            ]
        );
    }

    #[tokio::test]
    async fn concatenates_pages_in_order_until_token_absent() {
        let api = FakeApi::paged(vec![
            vec![vm("vm-1", &[]), vm("vm-2", &[])],
            vec![vm("vm-3", &[])],
            vec![vm("vm-4", &[]), vm("vm-5", &[])],
        ]);
        let records = get_properties(&api, &root(), &["VirtualMachine"], &["name", "snapshot"], "VirtualMachine")
            .await
            .unwrap();
        assert_eq!(ids(&records), vec!["vm-1", "vm-2", "vm-3", "vm-4", "vm-5"]);

        let calls = api.calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("continue")).count(), 2);
        assert_eq!(calls[1], "retrieve name,snapshot");
        assert_eq!(calls[2], "continue t1");
        assert_eq!(calls[3], "continue t2");
        assert_eq!(calls.last().unwrap(), "destroy ContainerView:session[1]view-1");
    }

    #[tokio::test]
    async fn empty_result_is_empty_list() {
        let api = FakeApi::paged(vec![]);
        let records = get_properties(&api, &root(), &["VirtualMachine"], &["name"], "VirtualMachine")
            .await
            .unwrap();
        assert!(records.is_empty());
        assert!(api.calls().iter().any(|c| c.starts_with("destroy")));
    }

    #[tokio::test]
    async fn fault_mid_pagination_propagates_and_view_is_destroyed() {
        let mut api = FakeApi::paged(vec![vec![vm("vm-1", &[])], vec![vm("vm-2", &[])], vec![vm("vm-3", &[])]]);
        api.fail_on_token = Some("t2".into());
        let err = get_properties(&api, &root(), &["VirtualMachine"], &["name"], "VirtualMachine")
            .await
            .unwrap_err();
        assert!(err.is_fault());
        assert_eq!(err.message, "token expired");
        assert_eq!(api.calls().last().unwrap(), "destroy ContainerView:session[1]view-1");
    }

    #[test]
    fn record_unwraps_any_values() {
        let record = PropertyRecord::from(vm(
            "vm-9",
            &[
                ("name", json!({"_typeName": "string", "_value": "web01"})),
                ("summary.config.vmPathName", json!("[ds1] web01/web01.vmx")),
            ],
        ));
        assert_eq!(record.name(), Some("web01"));
        assert_eq!(
            record.get::<String>("summary.config.vmPathName").unwrap().as_deref(),
            Some("[ds1] web01/web01.vmx")
        );
        assert!(record.get::<String>("snapshot").unwrap().is_none());
        assert!(!record.contains("snapshot"));
    }

    #[test]
    fn record_reports_type_mismatch() {
        let record = PropertyRecord::from(vm("vm-9", &[("name", json!(42))]));
        let err = record.get::<String>("name").unwrap_err();
        assert!(err.message.contains("Property 'name' of VirtualMachine:vm-9"));
    }
}
