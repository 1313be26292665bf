// Authenticated REST client for the hub's `/v1` API.
//
// Thin wrappers over the shared transport: every method is an HTTPS
// GET/DELETE plus a JSON decode. The hub returns bare payloads (no
// envelope), so the helpers only translate status codes and decode
// failures into typed errors.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credential;
use crate::error::Error;
use crate::models::{Device, Room, Scene, User};
use crate::transport::Transport;

/// REST client bound to one hub and one credential.
///
/// Strict fingerprint verification: the credential must already carry a
/// pinned fingerprint (from the authorization ceremony or persisted
/// configuration), otherwise every request fails the handshake.
pub struct HubClient {
    transport: Transport,
    base: Url,
}

impl HubClient {
    /// Connect to a hub by address and port.
    pub fn connect(address: &str, port: u16, credential: &Credential) -> Result<Self, Error> {
        let base = Url::parse(&format!("https://{address}:{port}/"))?;
        Self::from_base_url(base, credential)
    }

    /// Connect to an explicit base URL (tests, non-standard deployments).
    pub fn from_base_url(base: Url, credential: &Credential) -> Result<Self, Error> {
        let transport = Transport::new(credential, false)?;
        Ok(Self { transport, base })
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// `GET /v1/devices`
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        self.get_json("v1/devices").await
    }

    /// `GET /v1/devices/{id}`
    pub async fn get_device(&self, device_id: &str) -> Result<Device, Error> {
        self.get_json(&format!("v1/devices/{device_id}")).await
    }

    /// `GET /v1/hub/status` -- the hub describes itself as a device.
    pub async fn hub_status(&self) -> Result<Device, Error> {
        self.get_json("v1/hub/status").await
    }

    // ── Rooms ────────────────────────────────────────────────────────

    /// `GET /v1/rooms`
    pub async fn list_rooms(&self) -> Result<Vec<Room>, Error> {
        self.get_json("v1/rooms").await
    }

    /// `GET /v1/rooms/{id}`
    pub async fn get_room(&self, room_id: &str) -> Result<Room, Error> {
        self.get_json(&format!("v1/rooms/{room_id}")).await
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// `GET /v1/scenes`
    pub async fn list_scenes(&self) -> Result<Vec<Scene>, Error> {
        self.get_json("v1/scenes").await
    }

    /// `GET /v1/scenes/{id}`
    pub async fn get_scene(&self, scene_id: &str) -> Result<Scene, Error> {
        self.get_json(&format!("v1/scenes/{scene_id}")).await
    }

    // ── Users ────────────────────────────────────────────────────────

    /// `GET /v1/users`
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.get_json("v1/users").await
    }

    /// `GET /v1/users/{id}`
    pub async fn get_user(&self, user_id: &str) -> Result<User, Error> {
        self.get_json(&format!("v1/users/{user_id}")).await
    }

    /// `GET /v1/users/me` -- the user behind this credential.
    pub async fn current_user(&self) -> Result<User, Error> {
        self.get_json("v1/users/me").await
    }

    /// `DELETE /v1/users/{id}` -- revokes that user's access token.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), Error> {
        let url = self.base.join(&format!("v1/users/{user_id}"))?;
        debug!("DELETE {url}");

        let resp = self.transport.http().delete(url.clone()).send().await?;
        check_status(&url, resp.status())?;
        Ok(())
    }

    // ── Raw access ───────────────────────────────────────────────────

    /// Authenticated GET of an arbitrary API path, returning the raw
    /// body. Backs the CLI's `curl` command for endpoints this crate
    /// does not model.
    pub async fn get_raw(&self, path: &str) -> Result<String, Error> {
        let url = self.base.join(&format!("v1/{}", path.trim_start_matches('/')))?;
        debug!("GET {url}");

        let resp = self.transport.http().get(url.clone()).send().await?;
        check_status(&url, resp.status())?;
        resp.text().await.map_err(Error::Transport)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base.join(path)?;
        debug!("GET {url}");

        let resp = self.transport.http().get(url.clone()).send().await?;
        check_status(&url, resp.status())?;

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

fn check_status(url: &Url, status: reqwest::StatusCode) -> Result<(), Error> {
    if status.is_success() {
        return Ok(());
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("hub rejected the access token (HTTP {status})"),
        });
    }
    Err(Error::Api {
        status: status.as_u16(),
        url: url.to_string(),
    })
}
