//! Live event stream with indefinite reconnection.
//!
//! One WebSocket session per stream: connect, read one JSON envelope per
//! frame, dispatch to registered handlers in registration order. Read or
//! connect failures put the loop into a fixed-delay wait and it retries
//! forever -- the only way out is [`EventStream::stop`], and any error
//! observed after cancellation is suppressed, so a clean shutdown never
//! surfaces as a failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hemma_api::{Credential, EventStream};
//!
//! let credential = Credential::new(token, fingerprint);
//! let stream = Arc::new(EventStream::new("192.168.1.148", 8443, &credential)?);
//! stream.register_handler(|event| println!("{}", event.event_type), ["deviceStateChanged"]);
//!
//! let runner = tokio::spawn({
//!     let stream = Arc::clone(&stream);
//!     async move { stream.run().await }
//! });
//! // ... later:
//! stream.stop().await?;
//! runner.await??;
//! ```

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::Credential;
use crate::error::Error;
use crate::models::Event;
use crate::transport::Transport;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

// ── Handler registry ─────────────────────────────────────────────────

/// Callback invoked for each matching event, synchronously and in
/// arrival order. A slow handler delays every later event -- handlers
/// hand off real work themselves.
pub type EventHandler = Box<dyn Fn(&Event) + Send + Sync>;

struct Registration {
    handler: EventHandler,
    /// Event types this handler receives; empty matches everything.
    types: Vec<String>,
}

// ── Stream state ─────────────────────────────────────────────────────

/// Observable lifecycle of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    NotRunning,
    Connecting,
    Streaming,
    ReconnectWaiting,
    Stopped,
}

/// Reconnection behavior after a stream failure.
///
/// Deliberately flat and unbounded: the hub is a single local appliance,
/// so the loop waits a fixed delay and tries again until told to stop.
/// Replaceable so tests run with near-zero delays.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Wait between a failure and the next connection attempt.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(30),
        }
    }
}

/// The unit of mutable session state shared between `run`, `stop`, and
/// observers. Guarded by one mutex; the socket write-half lives apart in
/// an async mutex because `stop` sends the close frame from another task.
struct SessionState {
    state: StreamState,
    cancel: Option<CancellationToken>,
    last_error: Option<Arc<Error>>,
}

// ── EventStream ──────────────────────────────────────────────────────

/// Single long-lived WebSocket subscription to the hub's event feed.
///
/// At most one stream is active per instance; [`run`](Self::run) returns
/// `AlreadyRunning` when invoked concurrently. Registrations survive
/// reconnection and are never removed.
pub struct EventStream {
    transport: Transport,
    url: Url,
    policy: ReconnectPolicy,
    registrations: RwLock<Vec<Registration>>,
    session: Mutex<SessionState>,
    sink: tokio::sync::Mutex<Option<WsSink>>,
}

impl EventStream {
    /// Subscribe to a hub by address and port.
    ///
    /// Strict fingerprint verification -- the credential must carry a
    /// pinned fingerprint. A mismatch fails each connection attempt; an
    /// impersonated hub therefore fails every retry rather than ever
    /// being trusted.
    pub fn new(address: &str, port: u16, credential: &Credential) -> Result<Self, Error> {
        let url = Url::parse(&format!("wss://{address}:{port}/v1"))?;
        Self::from_url(url, credential)
    }

    /// Subscribe via an explicit stream URL (tests, non-standard
    /// deployments).
    pub fn from_url(url: Url, credential: &Credential) -> Result<Self, Error> {
        let transport = Transport::new(credential, false)?;
        Ok(Self {
            transport,
            url,
            policy: ReconnectPolicy::default(),
            registrations: RwLock::new(Vec::new()),
            session: Mutex::new(SessionState {
                state: StreamState::NotRunning,
                cancel: None,
                last_error: None,
            }),
            sink: tokio::sync::Mutex::new(None),
        })
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register an event handler.
    ///
    /// `types` filters by envelope type; an empty filter matches every
    /// event. Effective from the next dispatched event, including on an
    /// already-open stream. Dispatch order follows registration order.
    pub fn register_handler<F, I, S>(&self, handler: F, types: I)
    where
        F: Fn(&Event) + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registration = Registration {
            handler: Box::new(handler),
            types: types.into_iter().map(Into::into).collect(),
        };
        self.registrations
            .write()
            .expect("handler registry lock poisoned")
            .push(registration);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.lock_session().state
    }

    /// Most recent transient stream error. Cleared on successful
    /// (re)connection and on clean stop.
    pub fn last_error(&self) -> Option<Arc<Error>> {
        self.lock_session().last_error.clone()
    }

    /// Run the event loop until stopped.
    ///
    /// Blocks the calling task for the lifetime of the subscription --
    /// spawn it when non-blocking behavior is needed. Returns `Ok` on
    /// clean stop, `AlreadyRunning` if a loop is already active. Stream
    /// failures never end the loop; they are absorbed into the retry
    /// cycle and exposed only through [`last_error`](Self::last_error).
    pub async fn run(&self) -> Result<(), Error> {
        let cancel = {
            let mut session = self.lock_session();
            match session.state {
                StreamState::NotRunning | StreamState::Stopped => {}
                _ => return Err(Error::AlreadyRunning),
            }
            let cancel = CancellationToken::new();
            session.cancel = Some(cancel.clone());
            session.last_error = None;
            session.state = StreamState::Connecting;
            cancel
        };

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.connect_and_stream(&cancel) => {
                    let err = match result {
                        // Only a cancellation observed mid-read ends an
                        // attempt without an error.
                        Ok(()) => break,
                        Err(e) => e,
                    };
                    if cancel.is_cancelled() {
                        break;
                    }

                    tracing::warn!(
                        error = %err,
                        delay_secs = self.policy.delay.as_secs(),
                        "event stream interrupted, reconnecting after delay"
                    );
                    {
                        let mut session = self.lock_session();
                        session.last_error = Some(Arc::new(err));
                        session.state = StreamState::ReconnectWaiting;
                    }

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(self.policy.delay) => {}
                    }

                    let mut session = self.lock_session();
                    session.last_error = None;
                    session.state = StreamState::Connecting;
                }
            }
        }

        let mut session = self.lock_session();
        session.state = StreamState::Stopped;
        session.cancel = None;
        session.last_error = None;
        Ok(())
    }

    /// Stop the event loop.
    ///
    /// Idempotent: a no-op when nothing is running. Signals cancellation
    /// and sends a normal-closure frame if a socket is open; `run`
    /// observes the cancellation and returns `Ok`. Waiting for the loop
    /// to finish is the caller's business via `run`'s completion.
    pub async fn stop(&self) -> Result<(), Error> {
        let cancel = self.lock_session().cancel.clone();
        let Some(cancel) = cancel else {
            return Ok(());
        };
        cancel.cancel();

        if let Some(mut sink) = self.sink.lock().await.take() {
            // Best effort -- the connection may already be gone, and the
            // loop is ending either way.
            let close = Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            }));
            if let Err(e) = sink.send(close).await {
                tracing::debug!(error = %e, "close frame not delivered");
            }
        }
        Ok(())
    }

    // ── Single connection lifecycle ──────────────────────────────────

    /// Open one WebSocket connection and read frames until it drops.
    ///
    /// Returns `Ok` only when cancellation was observed; every other
    /// exit (close frame, stream end, read error) is an error for the
    /// retry cycle to absorb.
    async fn connect_and_stream(&self, cancel: &CancellationToken) -> Result<(), Error> {
        tracing::debug!(url = %self.url, "connecting to event stream");

        let uri: tungstenite::http::Uri = self
            .url
            .as_str()
            .parse()
            .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocket(e.to_string()))?;

        let mut request = ClientRequestBuilder::new(uri);
        if let Some(bearer) = self.transport.bearer() {
            request = request.with_header("Authorization", bearer);
        }

        let (ws, _response) = tokio_tungstenite::connect_async_tls_with_config(
            request,
            None,
            false,
            Some(self.transport.ws_connector()),
        )
        .await
        .map_err(|e| Error::WebSocket(e.to_string()))?;

        tracing::info!(url = %self.url, "event stream connected");

        let (sink, mut read) = ws.split();
        *self.sink.lock().await = Some(sink);
        {
            let mut session = self.lock_session();
            session.state = StreamState::Streaming;
            session.last_error = None;
        }

        let result = loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break Ok(()),
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.dispatch(&text),
                        Some(Ok(Message::Ping(_))) => {
                            // tungstenite answers pongs automatically
                        }
                        Some(Ok(Message::Close(_))) => {
                            break Err(Error::WebSocket("connection closed by hub".into()));
                        }
                        Some(Err(e)) => break Err(Error::WebSocket(e.to_string())),
                        None => break Err(Error::WebSocket("event stream ended".into())),
                        _ => {
                            // Binary, Pong, raw frames -- not part of the protocol
                        }
                    }
                }
            }
        };

        // Dropping both halves closes the connection; `stop` may already
        // have taken the sink to send the close frame.
        self.sink.lock().await.take();
        result
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    fn dispatch(&self, text: &str) {
        let event: Event = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable event frame");
                return;
            }
        };
        self.dispatch_event(&event);
    }

    fn dispatch_event(&self, event: &Event) {
        let registrations = self
            .registrations
            .read()
            .expect("handler registry lock poisoned");
        for registration in &*registrations {
            if registration.types.is_empty()
                || registration.types.iter().any(|t| t == &event.event_type)
            {
                (registration.handler)(event);
            }
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.session.lock().expect("session lock poisoned")
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn test_stream() -> EventStream {
        EventStream::from_url(
            Url::parse("ws://127.0.0.1:1/v1").expect("static url"),
            &Credential::default(),
        )
        .expect("transport should build")
    }

    fn envelope(event_type: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "evt-1",
            "time": "2026-03-01T10:00:00.000Z",
            "source": "hub",
            "type": event_type,
            "data": { "id": "dev-1" }
        }))
        .expect("valid envelope")
    }

    #[test]
    fn filtered_handler_only_sees_matching_types() {
        let stream = test_stream();
        let matched = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&matched);
        stream.register_handler(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            ["deviceStateChanged"],
        );

        stream.dispatch_event(&envelope("deviceStateChanged"));
        stream.dispatch_event(&envelope("other"));

        assert_eq!(matched.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_filter_matches_every_type() {
        let stream = test_stream();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&seen);
        stream.register_handler(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            Vec::<String>::new(),
        );

        stream.dispatch_event(&envelope("deviceStateChanged"));
        stream.dispatch_event(&envelope("other"));
        stream.dispatch_event(&envelope("sceneUpdated"));

        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn dispatch_follows_registration_order() {
        let stream = test_stream();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            stream.register_handler(
                move |_| order.lock().expect("order lock").push(tag),
                Vec::<String>::new(),
            );
        }

        stream.dispatch_event(&envelope("deviceStateChanged"));
        assert_eq!(
            *order.lock().expect("order lock"),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn undecodable_frames_are_skipped() {
        let stream = test_stream();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&seen);
        stream.register_handler(
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            Vec::<String>::new(),
        );

        stream.dispatch("not json at all");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fresh_stream_is_not_running() {
        let stream = test_stream();
        assert_eq!(stream.state(), StreamState::NotRunning);
        assert!(stream.last_error().is_none());
    }

    #[tokio::test]
    async fn stop_when_not_running_is_a_noop() {
        let stream = test_stream();
        stream.stop().await.expect("idempotent stop");
        assert_eq!(stream.state(), StreamState::NotRunning);
    }
}
