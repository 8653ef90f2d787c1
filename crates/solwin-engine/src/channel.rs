//! Engine-side protocol endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock, Weak};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use solwin_core::{
    Command, DashboardEnvelope, DashboardMessage, EngineEnvelope, EngineMessage, EngineWindow,
    InteractionPayload, ListenerId, MessageEvent, MessageListener, ProtocolError,
    SolarEngineState, TargetOrigin,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Outcome of [`EngineChannel::initialize`].
#[derive(Debug)]
pub enum Readiness {
    /// The document is not embedded; nothing was installed.
    Inert,
    /// The listener is installed and `ENGINE_READY` will be sent when this
    /// task completes. The task cannot be cancelled by the protocol.
    Scheduled(JoinHandle<()>),
}

impl Readiness {
    /// Whether the channel is live.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }
}

/// The embedded engine's end of the frame protocol.
///
/// Cloning is cheap and every clone drives the same channel. The inbound
/// listener is removed from the window once the last clone is dropped.
#[derive(Clone)]
pub struct EngineChannel {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for EngineChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineChannel")
            .field("embedded", &self.is_embedded())
            .field("parent_origin", &self.parent_origin())
            .finish_non_exhaustive()
    }
}

struct EngineInner {
    window: Arc<dyn EngineWindow>,
    config: EngineConfig,
    initialized: AtomicBool,
    embedded: AtomicBool,
    /// Set by the first inbound message and never changed afterwards.
    parent_origin: OnceLock<String>,
    state: RwLock<SolarEngineState>,
    listener: Mutex<Option<ListenerId>>,
}

impl EngineChannel {
    /// Create a channel over `window`. Nothing is installed until
    /// [`initialize`](Self::initialize) runs.
    #[must_use]
    pub fn new(window: Arc<dyn EngineWindow>, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                window,
                config,
                initialized: AtomicBool::new(false),
                embedded: AtomicBool::new(false),
                parent_origin: OnceLock::new(),
                state: RwLock::new(SolarEngineState::default()),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Determine whether the document is embedded and, if so, install the
    /// inbound listener and schedule the readiness announcement.
    ///
    /// A failed top-level check counts as embedded: it only happens under
    /// cross-origin embedding.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyInitialized`] on a second call and
    /// [`EngineError::RuntimeUnavailable`] when the document is embedded but
    /// no Tokio runtime is available for the timer.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn initialize(&self) -> EngineResult<Readiness> {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyInitialized);
        }

        let embedded = match self.inner.window.is_top_level() {
            Ok(top_level) => !top_level,
            Err(e) => {
                debug!(error = %e, "Top-level check failed, assuming cross-origin embedding");
                true
            },
        };

        if !embedded {
            info!("Not running in a frame, communication disabled");
            return Ok(Readiness::Inert);
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.inner.initialized.store(false, Ordering::SeqCst);
            return Err(EngineError::RuntimeUnavailable);
        };

        self.inner.embedded.store(true, Ordering::SeqCst);

        let listener = Arc::new(InboundListener {
            inner: Arc::downgrade(&self.inner),
        });
        let id = self.inner.window.add_message_listener(listener);
        *self.inner.listener.lock().expect("lock poisoned") = Some(id);

        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.config.ready_delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            match weak.upgrade() {
                Some(inner) => inner.announce_ready(),
                None => debug!("Engine channel dropped before readiness announcement"),
            }
        });

        debug!(delay = ?delay, "Engine channel listening");
        Ok(Readiness::Scheduled(task))
    }

    /// Process one inbound message from `origin`.
    ///
    /// The first call pins the parent origin, whatever the message contains.
    pub fn handle_inbound(&self, data: &Value, origin: &str) {
        self.inner.handle_inbound(data, origin);
    }

    /// Run a host command.
    pub fn handle_command(&self, command: &Command) {
        self.inner.handle_command(command);
    }

    /// Post a message to the parent. No-op when not embedded; delivery
    /// failures are logged and dropped.
    pub fn send(&self, message: EngineMessage) {
        self.inner.send(message);
    }

    /// Send the current state as a `STATE_UPDATE`.
    pub fn send_state_update(&self) {
        self.inner.send_state_update();
    }

    /// Shallow-merge `partial` into the state and, if `notify`, send a
    /// `STATE_UPDATE`.
    ///
    /// A location with a non-finite coordinate has no JSON form, so it is
    /// logged and left out of the merge; the other fields still apply.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn update_state(&self, mut partial: SolarEngineState, notify: bool) {
        if let Some(location) = partial.location
            && !(location.lat.is_finite() && location.lng.is_finite())
        {
            warn!(lat = location.lat, lng = location.lng, "Ignoring non-finite location");
            partial.location = None;
        }

        self.inner
            .state
            .write()
            .expect("lock poisoned")
            .merge(partial);

        if notify {
            self.inner.send_state_update();
        }
    }

    /// Reset the state to empty and, if `notify`, send a `STATE_UPDATE`.
    ///
    /// [`update_state`](Self::update_state) can only set fields; this is the
    /// way to clear them.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_state(&self, notify: bool) {
        *self.inner.state.write().expect("lock poisoned") = SolarEngineState::default();

        if notify {
            self.inner.send_state_update();
        }
    }

    /// Send an `INTERACTION` for `action`.
    pub fn report_interaction(&self, action: impl Into<String>, data: Option<Value>) {
        let payload = InteractionPayload::now(action, data);
        self.inner.send(EngineMessage::Interaction(payload));
    }

    /// Snapshot of the current state.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn state(&self) -> SolarEngineState {
        self.inner.state.read().expect("lock poisoned").clone()
    }

    /// Where outbound messages go: the wildcard until the first inbound
    /// message, the pinned origin afterwards.
    #[must_use]
    pub fn parent_origin(&self) -> TargetOrigin {
        self.inner.target()
    }

    /// Whether `initialize` found the document embedded.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.inner.embedded.load(Ordering::SeqCst)
    }

    /// Settings in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }
}

impl EngineInner {
    fn target(&self) -> TargetOrigin {
        self.parent_origin
            .get()
            .map_or(TargetOrigin::Any, |origin| TargetOrigin::Exact(origin.clone()))
    }

    fn handle_inbound(&self, data: &Value, origin: &str) {
        let pinned = self.parent_origin.get_or_init(|| {
            info!(origin, "Pinned parent origin");
            origin.to_owned()
        });
        if pinned != origin {
            debug!(pinned = %pinned, origin, "Message from a different origin, pin unchanged");
        }

        match DashboardEnvelope::from_value(data) {
            Ok(envelope) => {
                trace!(
                    message_type = %envelope.message.message_type(),
                    has_auth = envelope.auth.is_some(),
                    "Inbound message"
                );
                match envelope.message {
                    DashboardMessage::Command(command) => self.handle_command(&command),
                    DashboardMessage::StateRequest => self.send_state_update(),
                }
            },
            Err(ProtocolError::UnknownType(message_type)) => {
                warn!(%message_type, "Unknown message type");
            },
            Err(e) => warn!(error = %e, "Dropping malformed message"),
        }
    }

    fn handle_command(&self, command: &Command) {
        debug!(%command, "Received command");
        match command {
            Command::Initialize => {},
            Command::Refresh => self.window.reload(),
            Command::Unknown(name) => warn!(command = %name, "Unknown command"),
        }
    }

    fn send(&self, message: EngineMessage) {
        if !self.embedded.load(Ordering::SeqCst) {
            trace!(message_type = %message.message_type(), "Not embedded, dropping send");
            return;
        }

        let envelope = EngineEnvelope::now(message);
        let message_type = envelope.message_type();
        let data = match envelope.to_value() {
            Ok(data) => data,
            Err(e) => {
                error!(%message_type, error = %e, "Failed to encode message");
                return;
            },
        };

        let target = self.target();
        match self.window.post_to_parent(data, &target) {
            Ok(()) => debug!(%message_type, %target, "Sent message to dashboard"),
            Err(e) => error!(%message_type, error = %e, "Failed to send message to dashboard"),
        }
    }

    fn send_state_update(&self) {
        let snapshot = self.state.read().expect("lock poisoned").clone();
        self.send(EngineMessage::StateUpdate(snapshot));
    }

    fn announce_ready(&self) {
        self.send(EngineMessage::EngineReady(self.config.ready_payload()));
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Ok(slot) = self.listener.get_mut() {
            if let Some(id) = slot.take() {
                self.window.remove_message_listener(id);
                debug!("Engine listener removed");
            }
        }
    }
}

/// Window listener feeding the channel. Holds a weak reference so the
/// window does not keep the channel alive.
struct InboundListener {
    inner: Weak<EngineInner>,
}

impl MessageListener for InboundListener {
    fn on_message(&self, event: &MessageEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle_inbound(&event.data, &event.origin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solwin_core::{EngineMessageType, Location};
    use solwin_test::RecordingWindow;
    use std::time::Duration;

    fn channel_over(window: &Arc<RecordingWindow>) -> EngineChannel {
        EngineChannel::new(
            Arc::clone(window) as Arc<dyn EngineWindow>,
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_top_level_document_is_inert() {
        let window = RecordingWindow::top_level();
        let channel = channel_over(&window);

        let readiness = channel.initialize().unwrap();
        assert!(!readiness.is_scheduled());
        assert!(!channel.is_embedded());
        assert_eq!(window.listener_count(), 0);

        channel.update_state(SolarEngineState::new().with_address("x"), true);
        channel.report_interaction("click", None);
        channel.send_state_update();
        assert!(window.posted().is_empty());
    }

    #[tokio::test]
    async fn test_introspection_failure_counts_as_embedded() {
        let window = RecordingWindow::cross_origin();
        let channel = channel_over(&window);

        assert!(channel.initialize().unwrap().is_scheduled());
        assert!(channel.is_embedded());
        assert_eq!(window.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_second_initialize_is_rejected() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);

        channel.initialize().unwrap();
        assert!(matches!(
            channel.initialize(),
            Err(EngineError::AlreadyInitialized)
        ));
        assert_eq!(window.listener_count(), 1);
    }

    #[test]
    fn test_initialize_without_runtime() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);

        assert!(matches!(
            channel.initialize(),
            Err(EngineError::RuntimeUnavailable)
        ));
        assert_eq!(window.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_announced_after_delay_to_wildcard() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);

        let start = tokio::time::Instant::now();
        let Readiness::Scheduled(task) = channel.initialize().unwrap() else {
            panic!("expected a scheduled announcement");
        };
        assert!(window.posted().is_empty());

        task.await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));

        let posted = window.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].target, TargetOrigin::Any);

        let envelopes = window.posted_envelopes();
        match &envelopes[0].message {
            EngineMessage::EngineReady(ready) => {
                assert_eq!(ready.version, "1.0.0");
                assert_eq!(ready.capabilities, vec!["solar-analysis", "map-interaction"]);
            },
            other => panic!("expected ENGINE_READY, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_skipped_when_channel_dropped() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);

        let Readiness::Scheduled(task) = channel.initialize().unwrap() else {
            panic!("expected a scheduled announcement");
        };
        drop(channel);

        task.await.unwrap();
        assert!(window.posted().is_empty());
        assert_eq!(window.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_origin_pinned_by_first_message_only() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();
        assert_eq!(channel.parent_origin(), TargetOrigin::Any);

        window.deliver(json!({"type": "PING"}), "https://dashboard.example");
        window.deliver(
            json!({"type": "STATE_REQUEST"}),
            "https://attacker.example",
        );
        window.deliver(
            json!({"type": "COMMAND", "payload": "INITIALIZE"}),
            "https://other.example",
        );

        assert_eq!(
            channel.parent_origin(),
            TargetOrigin::Exact("https://dashboard.example".into())
        );

        let posted = window.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(
            posted[0].target,
            TargetOrigin::Exact("https://dashboard.example".into())
        );
    }

    #[tokio::test]
    async fn test_state_request_replies_with_current_state() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();

        let state = SolarEngineState::new()
            .with_location(Location::new(40.0, -105.0))
            .with_address("303 S Technology Ct");
        channel.update_state(state.clone(), false);
        assert!(window.posted().is_empty());

        channel.handle_inbound(&json!({"type": "STATE_REQUEST"}), "https://host.example");

        let envelopes = window.posted_envelopes();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].message, EngineMessage::StateUpdate(state));
    }

    #[tokio::test]
    async fn test_refresh_only_reloads() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();
        channel.update_state(SolarEngineState::new().with_address("a"), false);

        window.deliver(
            json!({"type": "COMMAND", "payload": "REFRESH"}),
            "https://host.example",
        );

        assert_eq!(window.reload_count(), 1);
        assert!(window.posted().is_empty());
        assert_eq!(channel.state().address.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_refresh_survives_non_string_auth() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();

        window.deliver(
            json!({"type": "COMMAND", "payload": "REFRESH", "auth": 123}),
            "https://host.example",
        );
        window.deliver(
            json!({"type": "STATE_REQUEST", "timestamp": "now"}),
            "https://host.example",
        );

        assert_eq!(window.reload_count(), 1);
        assert_eq!(window.posted_envelopes().len(), 1);
    }

    #[tokio::test]
    async fn test_non_finite_location_is_not_merged() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();
        channel.update_state(
            SolarEngineState::new().with_location(Location::new(40.0, -105.0)),
            false,
        );

        channel.update_state(
            SolarEngineState::new()
                .with_location(Location::new(f64::NAN, f64::INFINITY))
                .with_address("kept"),
            true,
        );

        let state = channel.state();
        assert_eq!(state.location, Some(Location::new(40.0, -105.0)));
        assert_eq!(state.address.as_deref(), Some("kept"));
        let envelopes = window.posted_envelopes();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].message, EngineMessage::StateUpdate(state));
    }

    #[tokio::test]
    async fn test_clear_state_empties_and_notifies() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();
        channel.update_state(SolarEngineState::new().with_address("a"), false);

        channel.clear_state(true);

        assert!(channel.state().is_empty());
        let envelopes = window.posted_envelopes();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(
            envelopes[0].message,
            EngineMessage::StateUpdate(SolarEngineState::new())
        );
    }

    #[tokio::test]
    async fn test_initialize_and_unknown_commands_are_silent() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();

        channel.handle_command(&Command::Initialize);
        channel.handle_command(&Command::Unknown("LAUNCH".into()));
        window.deliver(
            json!({"type": "COMMAND", "payload": {"not": "a string"}}),
            "https://host.example",
        );

        assert_eq!(window.reload_count(), 0);
        assert!(window.posted().is_empty());
    }

    #[tokio::test]
    async fn test_update_state_notifies_with_merged_snapshot() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();

        channel.update_state(SolarEngineState::new().with_address("a"), true);
        channel.update_state(
            SolarEngineState::new().with_solar_potential(json!({"panels": 12})),
            true,
        );

        let envelopes = window.posted_envelopes();
        assert_eq!(envelopes.len(), 2);
        let expected = SolarEngineState::new()
            .with_address("a")
            .with_solar_potential(json!({"panels": 12}));
        assert_eq!(envelopes[1].message, EngineMessage::StateUpdate(expected));
    }

    #[tokio::test]
    async fn test_report_interaction() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();

        channel.report_interaction("map-click", Some(json!({"lat": 1.0})));

        let envelopes = window.posted_envelopes();
        assert_eq!(envelopes[0].message_type(), EngineMessageType::Interaction);
        match &envelopes[0].message {
            EngineMessage::Interaction(payload) => {
                assert_eq!(payload.action, "map-click");
                assert_eq!(payload.data, Some(json!({"lat": 1.0})));
                assert!(payload.timestamp > 0);
            },
            other => panic!("expected INTERACTION, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();

        window.set_parent_gone(true);
        channel.send_state_update();
        channel.report_interaction("x", None);
        assert!(window.posted().is_empty());

        window.set_parent_gone(false);
        channel.send_state_update();
        assert_eq!(window.posted().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_removes_listener() {
        let window = RecordingWindow::framed();
        let channel = channel_over(&window);
        channel.initialize().unwrap();
        assert_eq!(window.listener_count(), 1);

        let clone = channel.clone();
        drop(channel);
        assert_eq!(window.listener_count(), 1);

        drop(clone);
        assert_eq!(window.listener_count(), 0);
    }
}
