//! Enumeration tests: device/object pagination, device-type dereference and
//! recursive tree traversal.

use metasys::{
    get_available_device_types, get_network_devices, get_objects, MetasysClient,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MetasysClient {
    MetasysClient::builder()
        .base_url(server.uri())
        .build()
        .expect("client should build")
}

fn device(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name })
}

const PARENT: &str = "00000000-0000-0000-0000-0000000000aa";
const CHILD_A: &str = "00000000-0000-0000-0000-0000000000ab";
const CHILD_B: &str = "00000000-0000-0000-0000-0000000000ac";
const GRANDCHILD: &str = "00000000-0000-0000-0000-0000000000ad";

// =============================================================================
// Pagination Tests
// =============================================================================

#[tokio::test]
async fn test_network_devices_aggregates_pages_in_order() {
    let server = MockServer::start().await;
    let next = format!("{}/networkDevices?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/networkDevices"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                device("00000000-0000-0000-0000-000000000001", "NAE-01"),
                device("00000000-0000-0000-0000-000000000002", "NAE-02"),
            ],
            "next": next,
            "total": 5,
        })))
        .expect(1)
        .mount(&server)
        .await;
    let next = format!("{}/networkDevices?page=3", server.uri());
    Mock::given(method("GET"))
        .and(path("/networkDevices"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                device("00000000-0000-0000-0000-000000000003", "NAE-03"),
                device("00000000-0000-0000-0000-000000000004", "NAE-04"),
            ],
            "next": next,
            "total": 5,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/networkDevices"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [device("00000000-0000-0000-0000-000000000005", "NAE-05")],
            "next": null,
            "total": 5,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let devices = get_network_devices(&client, None)
        .await
        .expect("listing should succeed");

    assert_eq!(devices.len(), 5);
    let names: Vec<_> = devices.iter().filter_map(|d| d.name.as_deref()).collect();
    assert_eq!(names, vec!["NAE-01", "NAE-02", "NAE-03", "NAE-04", "NAE-05"]);
}

#[tokio::test]
async fn test_network_devices_type_filter_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networkDevices"))
        .and(query_param("page", "1"))
        .and(query_param("type", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [device("00000000-0000-0000-0000-000000000001", "NAE-01")],
            "next": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let devices = get_network_devices(&client, Some("5"))
        .await
        .expect("listing should succeed");
    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn test_malformed_page_ends_listing_without_error() {
    let server = MockServer::start().await;
    let next = format!("{}/networkDevices?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/networkDevices"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [device("00000000-0000-0000-0000-000000000001", "NAE-01")],
            "next": next,
        })))
        .mount(&server)
        .await;
    // Page 2 has no well-formed items; listing stops with what it has.
    Mock::given(method("GET"))
        .and(path("/networkDevices"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": "garbled",
            "next": format!("{}/networkDevices?page=3", server.uri()),
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let devices = get_network_devices(&client, None)
        .await
        .expect("listing should tolerate the malformed page");
    assert_eq!(devices.len(), 1);
}

// =============================================================================
// Device Type Tests
// =============================================================================

#[tokio::test]
async fn test_available_device_types_dereferences_type_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networkDevices/availableTypes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "typeUrl": format!("{}/enumSets/508/members/5", server.uri()) },
                { "typeUrl": format!("{}/enumSets/508/members/6", server.uri()) },
            ],
            "total": 2,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enumSets/508/members/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "item": { "id": 5, "description": "NAE55" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enumSets/508/members/6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "item": { "id": 6, "description": "NCE25" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut types = get_available_device_types(&client)
        .await
        .expect("type listing should succeed");

    types.sort_by_key(|t| t.id);
    assert_eq!(types.len(), 2);
    assert_eq!(types[0].description.as_deref(), Some("NAE55"));
    assert_eq!(types[1].description.as_deref(), Some("NCE25"));
}

#[tokio::test]
async fn test_available_device_types_drops_failed_dereference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/networkDevices/availableTypes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "typeUrl": format!("{}/enumSets/508/members/5", server.uri()) },
                { "typeUrl": format!("{}/enumSets/508/members/6", server.uri()) },
            ],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enumSets/508/members/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "item": { "id": 5, "description": "NAE55" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enumSets/508/members/6"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let types = get_available_device_types(&client)
        .await
        .expect("type listing should tolerate one failure");
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].description.as_deref(), Some("NAE55"));
}

// =============================================================================
// Tree Traversal Tests
// =============================================================================

fn children_page(items: serde_json::Value) -> serde_json::Value {
    json!({ "items": items, "next": null, "total": 2 })
}

#[tokio::test]
async fn test_get_objects_two_levels_stops_at_grandchildren() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{PARENT}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([
            { "id": CHILD_A, "name": "AHU-1" },
            { "id": CHILD_B, "name": "AHU-2" },
        ]))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{CHILD_A}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([
            { "id": GRANDCHILD, "name": "FAN-1" },
        ]))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{CHILD_B}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([]))))
        .mount(&server)
        .await;
    // Grandchild listings must not be requested at levels=2.
    Mock::given(method("GET"))
        .and(path(format!("/objects/{GRANDCHILD}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let objects = get_objects(&client, Uuid::parse_str(PARENT).unwrap(), 2)
        .await
        .expect("traversal should succeed")
        .expect("levels >= 1 should yield a listing");

    assert_eq!(objects.len(), 2);

    let ahu1 = &objects[0];
    let children = ahu1.children.as_ref().expect("children should be fetched");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name.as_deref(), Some("FAN-1"));
    // Exactly one level deep: the grandchild carries no child list.
    assert!(children[0].children.is_none());

    // AHU-2 has an (empty) fetched child list, distinct from "not fetched".
    let ahu2 = &objects[1];
    assert_eq!(ahu2.children.as_ref().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_get_objects_single_level_has_no_children() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{PARENT}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([
            { "id": CHILD_A, "name": "AHU-1" },
        ]))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let objects = get_objects(&client, Uuid::parse_str(PARENT).unwrap(), 1)
        .await
        .expect("traversal should succeed")
        .expect("levels >= 1 should yield a listing");

    assert_eq!(objects.len(), 1);
    assert!(objects[0].children.is_none());
}

#[tokio::test]
async fn test_get_objects_zero_levels_is_degenerate_none() {
    let server = MockServer::start().await;

    let client = client_for(&server);
    let result = get_objects(&client, Uuid::parse_str(PARENT).unwrap(), 0)
        .await
        .expect("degenerate call should not error");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_get_objects_failed_child_fetch_degrades_to_childless() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{PARENT}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([
            { "id": CHILD_A, "name": "AHU-1" },
            { "id": CHILD_B, "name": "AHU-2" },
        ]))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{CHILD_A}/objects")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/objects/{CHILD_B}/objects")))
        .respond_with(ResponseTemplate::new(200).set_body_json(children_page(json!([
            { "id": GRANDCHILD, "name": "FAN-2" },
        ]))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let objects = get_objects(&client, Uuid::parse_str(PARENT).unwrap(), 2)
        .await
        .expect("traversal should tolerate a failed child fetch")
        .expect("levels >= 1 should yield a listing");

    assert_eq!(objects.len(), 2);
    // AHU-1's children could not be fetched; it degrades to childless.
    assert!(objects[0].children.is_none());
    // Its sibling is unaffected.
    let children = objects[1].children.as_ref().expect("sibling children");
    assert_eq!(children[0].name.as_deref(), Some("FAN-2"));
}
