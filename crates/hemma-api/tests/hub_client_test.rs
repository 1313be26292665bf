// Integration tests for `HubClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hemma_api::{Credential, Error, HubClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HubClient) {
    let server = MockServer::start().await;
    let base = server.uri().parse().expect("mock server uri");
    let client = HubClient::from_base_url(base, &Credential::new("tok-test", ""))
        .expect("client should build");
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "id": "dev-1",
            "type": "light",
            "deviceType": "lightBulb",
            "isReachable": true,
            "attributes": { "customName": "Desk lamp" },
            "room": { "id": "room-1", "name": "Study" }
        },
        {
            "id": "dev-2",
            "type": "sensor",
            "deviceType": "motionSensor",
            "isReachable": false
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .and(header("authorization", "Bearer tok-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.expect("list should succeed");

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "dev-1");
    assert_eq!(devices[0].custom_name(), Some("Desk lamp"));
    assert!(devices[0].is_reachable);
    assert_eq!(devices[1].device_type, "motionSensor");
    assert!(!devices[1].is_reachable);
}

#[tokio::test]
async fn test_hub_status() {
    let (server, client) = setup().await;

    let body = json!({
        "id": "hub-1",
        "type": "gateway",
        "deviceType": "gateway",
        "isReachable": true,
        "attributes": { "customName": "Hallway hub", "firmwareVersion": "2.390.47" }
    });

    Mock::given(method("GET"))
        .and(path("/v1/hub/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let hub = client.hub_status().await.expect("status should succeed");
    assert_eq!(hub.custom_name(), Some("Hallway hub"));
    assert_eq!(hub.attributes["firmwareVersion"], "2.390.47");
}

#[tokio::test]
async fn test_list_rooms_and_users() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "room-1", "name": "Study" },
            { "id": "room-2", "name": "Kitchen" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "uid": "u-1", "name": "sal@laptop", "createdTimestamp": "2026-01-05T08:30:00.000Z" }
        ])))
        .mount(&server)
        .await;

    let rooms = client.list_rooms().await.expect("rooms");
    assert_eq!(rooms[1].name, "Kitchen");

    let users = client.list_users().await.expect("users");
    assert_eq!(users[0].id, "u-1");
}

#[tokio::test]
async fn test_get_scene() {
    let (server, client) = setup().await;

    let body = json!({
        "id": "scene-1",
        "info": { "name": "Movie night" },
        "type": "userScene",
        "createdAt": "2026-02-01T18:00:00.000Z",
        "triggers": [{ "id": "t-1", "type": "app", "disabled": false }],
        "actions": [{ "id": "a-1", "type": "device", "deviceId": "dev-1",
                      "attributes": { "isOn": false } }]
    });

    Mock::given(method("GET"))
        .and(path("/v1/scenes/scene-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let scene = client.get_scene("scene-1").await.expect("scene");
    assert_eq!(scene.info.name, "Movie night");
    assert_eq!(scene.actions[0].device_id, "dev-1");
}

#[tokio::test]
async fn test_delete_user() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/users/u-1"))
        .and(header("authorization", "Bearer tok-test"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_user("u-1").await.expect("delete should succeed");
}

#[tokio::test]
async fn test_get_raw_returns_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/hub/ota/environment"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"environment":"prod"}"#))
        .mount(&server)
        .await;

    let body = client
        .get_raw("hub/ota/environment")
        .await
        .expect("raw get");
    assert_eq!(body, r#"{"environment":"prod"}"#);

    // Leading slash is tolerated.
    let body = client
        .get_raw("/hub/ota/environment")
        .await
        .expect("raw get with slash");
    assert!(body.contains("prod"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_404_keeps_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    match client.get_device("nope").await {
        Err(Error::Api { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/v1/devices/nope"), "url was: {url}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    match client.list_devices().await {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
