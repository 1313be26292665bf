//! Wire models for the hub's REST and event APIs.
//!
//! All payloads are camelCase JSON. Device attributes are an open-ended
//! map -- the hub ships dozens of device-specific keys and grows more
//! with every firmware release, so nothing beyond the stable envelope is
//! typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One event pushed over the WebSocket stream.
///
/// Immutable once decoded; exactly one envelope per text frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    pub time: DateTime<Utc>,

    /// Originator of the event (hub or client identifier).
    pub source: String,

    /// Event type, e.g. `"deviceStateChanged"`. Handler type filters
    /// match against this field.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Snapshot of the affected device at event time.
    #[serde(rename = "data")]
    pub device: Device,
}

/// A device known to the hub, or the hub itself (`hub/status`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,

    /// Coarse category: `"light"`, `"sensor"`, `"gateway"`, ...
    #[serde(rename = "type", default)]
    pub device_category: String,

    /// Detailed type, e.g. `"motionSensor"`.
    #[serde(rename = "deviceType", default)]
    pub device_type: String,

    #[serde(default)]
    pub is_reachable: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,

    /// Device-specific attributes (customName, batteryPercentage, ...).
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub room: Option<Room>,
}

impl Device {
    /// The user-assigned name, when the device carries one.
    pub fn custom_name(&self) -> Option<&str> {
        self.attributes.get("customName").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,

    pub info: SceneInfo,

    #[serde(rename = "type", default)]
    pub scene_type: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub triggers: Vec<Trigger>,

    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub trigger_type: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub action_type: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// A user authorized on the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "uid")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "createdTimestamp", default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_event_envelope() {
        let json = r#"{
            "id": "evt-1",
            "time": "2026-03-01T10:00:00.000Z",
            "source": "hub",
            "type": "deviceStateChanged",
            "data": {
                "id": "dev-1",
                "type": "light",
                "deviceType": "lightBulb",
                "isReachable": true,
                "attributes": { "customName": "Desk lamp", "isOn": true },
                "room": { "id": "room-1", "name": "Study" }
            }
        }"#;

        let event: Event = serde_json::from_str(json).expect("valid envelope");
        assert_eq!(event.event_type, "deviceStateChanged");
        assert_eq!(event.device.id, "dev-1");
        assert_eq!(event.device.custom_name(), Some("Desk lamp"));
        assert_eq!(event.device.attributes["isOn"], true);
        assert_eq!(event.device.room.as_ref().map(|r| r.name.as_str()), Some("Study"));
    }

    #[test]
    fn deserialize_device_with_sparse_fields() {
        // Hub status responses omit room and timestamps.
        let json = r#"{ "id": "hub-1", "type": "gateway", "deviceType": "gateway" }"#;
        let device: Device = serde_json::from_str(json).expect("sparse device");
        assert_eq!(device.device_category, "gateway");
        assert!(!device.is_reachable);
        assert!(device.room.is_none());
        assert!(device.custom_name().is_none());
    }

    #[test]
    fn deserialize_user_uid_field() {
        let json = r#"{ "uid": "u-1", "name": "sal@laptop", "createdTimestamp": "2026-01-05T08:30:00.000Z" }"#;
        let user: User = serde_json::from_str(json).expect("valid user");
        assert_eq!(user.id, "u-1");
        assert_eq!(user.name, "sal@laptop");
        assert!(user.created_at.is_some());
    }
}
