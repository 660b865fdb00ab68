use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::{json, Value};
use vsr_vmware::hardware::hardware_report;
use vsr_vmware::types::{ManagedObjectReference, VsphereConfig};
use vsr_vmware::{get_properties, VimApi, VsphereClient};

const BASE: &str = "/sdk/vim25/8.0.1.0";

fn moref(t: &str, v: &str) -> Value {
    json!({"_typeName": "ManagedObjectReference", "type": t, "value": v})
}

fn config() -> VsphereConfig {
    VsphereConfig {
        host: "127.0.0.1".into(),
        username: "admin".into(),
        password: SecretString::new("secret".into()),
        ..Default::default()
    }
}

async fn mock_content(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{BASE}/ServiceInstance/ServiceInstance/content"));
            then.status(200).json_body(json!({
                "_typeName": "ServiceContent",
                "rootFolder": moref("Folder", "group-d1"),
                "propertyCollector": moref("PropertyCollector", "propertyCollector"),
                "viewManager": moref("ViewManager", "ViewManager"),
                "sessionManager": moref("SessionManager", "SessionManager"),
                "about": {"_typeName": "AboutInfo", "fullName": "VMware vCenter Server 8.0.1", "apiVersion": "8.0.1.0"}
            }));
        })
        .await;
}

async fn mock_login(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/SessionManager/SessionManager/Login"))
                .json_body(json!({"userName": "admin", "password": "secret"}));
            then.status(200)
                .header("vmware-api-session-id", "sess-1")
                .json_body(json!({"_typeName": "UserSession", "key": "k1", "userName": "VSPHERE.LOCAL\\admin"}));
        })
        .await;
}

async fn mock_view(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/ViewManager/ViewManager/CreateContainerView"))
                .header("vmware-api-session-id", "sess-1")
                .json_body(json!({
                    "container": moref("Folder", "group-d1"),
                    "type": ["VirtualMachine"],
                    "recursive": true
                }));
            then.status(200).json_body(moref("ContainerView", "view-1"));
        })
        .await;
    let destroy = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/ContainerView/view-1/DestroyView"))
                .header("vmware-api-session-id", "sess-1");
            then.status(204);
        })
        .await;
    (create, destroy)
}

async fn connected(server: &MockServer) -> VsphereClient {
    mock_content(server).await;
    mock_login(server).await;
    let mut client = VsphereClient::with_base_url(&config(), server.url(BASE)).unwrap();
    client.login().await.unwrap();
    client
}

fn object(id: &str, name: &str) -> Value {
    json!({
        "_typeName": "ObjectContent",
        "obj": moref("VirtualMachine", id),
        "propSet": [{"_typeName": "DynamicProperty", "name": "name", "val": {"_typeName": "string", "_value": name}}]
    })
}

#[tokio::test]
async fn login_takes_session_id_from_header() {
    let server = MockServer::start_async().await;
    let client = connected(&server).await;
    assert!(client.is_connected());
    assert_eq!(client.session_id(), Some("sess-1"));
    assert_eq!(
        client.root_folder().unwrap(),
        ManagedObjectReference::new("Folder", "group-d1")
    );
}

#[tokio::test]
async fn invalid_login_fault_is_auth_error() {
    let server = MockServer::start_async().await;
    mock_content(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{BASE}/SessionManager/SessionManager/Login"));
            then.status(500).json_body(json!({
                "_typeName": "InvalidLogin",
                "faultstring": "Cannot complete login due to an incorrect user name or password."
            }));
        })
        .await;

    let mut client = VsphereClient::with_base_url(&config(), server.url(BASE)).unwrap();
    let err = client.login().await.unwrap_err();
    assert!(err.is_auth());
    assert!(err.message.contains("incorrect user name or password"));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn unreachable_endpoint_is_auth_error() {
    let mut client = VsphereClient::with_base_url(&config(), "http://127.0.0.1:1/sdk/vim25/8.0.1.0").unwrap();
    let err = client.login().await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn logout_ends_session() {
    let server = MockServer::start_async().await;
    let mut client = connected(&server).await;
    let logout = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/SessionManager/SessionManager/Logout"))
                .header("vmware-api-session-id", "sess-1");
            then.status(204);
        })
        .await;

    client.logout().await.unwrap();
    logout.assert_async().await;
    assert!(!client.is_connected());

    // second logout is a no-op
    client.logout().await.unwrap();
    assert_eq!(logout.hits_async().await, 1);
}

#[tokio::test]
async fn retrieves_all_pages_over_http() {
    let server = MockServer::start_async().await;
    let client = connected(&server).await;
    let (create, destroy) = mock_view(&server).await;

    let first = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/PropertyCollector/propertyCollector/RetrievePropertiesEx"))
                .header("vmware-api-session-id", "sess-1");
            then.status(200).json_body(json!({
                "_typeName": "RetrieveResult",
                "objects": [object("vm-1", "web01"), object("vm-2", "web02")],
                "token": "t1"
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/PropertyCollector/propertyCollector/ContinueRetrievePropertiesEx"))
                .json_body(json!({"token": "t1"}));
            then.status(200).json_body(json!({
                "_typeName": "RetrieveResult",
                "objects": [object("vm-3", "db01")],
                "token": "t2"
            }));
        })
        .await;
    let third = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/PropertyCollector/propertyCollector/ContinueRetrievePropertiesEx"))
                .json_body(json!({"token": "t2"}));
            then.status(200).json_body(json!({
                "_typeName": "RetrieveResult",
                "objects": [object("vm-4", "db02")]
            }));
        })
        .await;

    let root = client.root_folder().unwrap();
    let records = get_properties(&client, &root, &["VirtualMachine"], &["name"], "VirtualMachine")
        .await
        .unwrap();

    let names: Vec<&str> = records.iter().filter_map(|r| r.name()).collect();
    assert_eq!(names, vec!["web01", "web02", "db01", "db02"]);
    create.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;
    destroy.assert_async().await;
}

#[tokio::test]
async fn empty_retrieve_body_means_no_objects() {
    let server = MockServer::start_async().await;
    let client = connected(&server).await;
    let (_create, destroy) = mock_view(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/PropertyCollector/propertyCollector/RetrievePropertiesEx"));
            then.status(200);
        })
        .await;

    let root = client.root_folder().unwrap();
    let records = get_properties(&client, &root, &["VirtualMachine"], &["name"], "VirtualMachine")
        .await
        .unwrap();
    assert!(records.is_empty());
    destroy.assert_async().await;
}

#[tokio::test]
async fn retrieve_fault_propagates_after_view_destroyed() {
    let server = MockServer::start_async().await;
    let client = connected(&server).await;
    let (_create, destroy) = mock_view(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{BASE}/PropertyCollector/propertyCollector/RetrievePropertiesEx"));
            then.status(500).json_body(json!({
                "_typeName": "InvalidProperty",
                "faultstring": "InvalidProperty: config.hardware.bogus"
            }));
        })
        .await;

    let err = hardware_report(&client, &["web01".to_string()]).await.unwrap_err();
    assert!(err.is_fault());
    assert_eq!(err.message, "InvalidProperty: config.hardware.bogus");
    destroy.assert_async().await;
}
