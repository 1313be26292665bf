// hemma-api: Async Rust client for the IKEA DIRIGERA smart-home hub

pub mod auth;
pub mod client;
pub mod discover;
pub mod error;
pub mod events;
pub mod models;
pub mod transport;
pub mod trust;

pub use auth::{AuthPolicy, AuthProgress, Authorizer, Credential};
pub use client::HubClient;
pub use error::Error;
pub use events::{EventStream, ReconnectPolicy, StreamState};
