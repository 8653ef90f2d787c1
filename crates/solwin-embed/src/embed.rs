//! Embed instances.

use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, error, info, warn};
use url::Url;

use solwin_core::{
    Command, DashboardEnvelope, DashboardMessage, EngineEnvelope, EngineMessage,
    EngineMessageType, Frame, FrameSpec, HostDocument, InteractionPayload, ListenerId,
    MessageEvent, MessageListener, ReadyPayload, SolarEngineState, TargetOrigin,
};

use crate::error::{EmbedError, EmbedResult};
use crate::options::{EmbedOptions, build_embed_url};
use crate::registry::{HandlerId, HandlerRegistry, MessageFilter, MessageHandler};

/// State shared between the handle and the document listener.
#[derive(Debug)]
struct EmbedShared {
    frame: Arc<dyn Frame>,
    messages: Mutex<Vec<EngineEnvelope>>,
    handlers: HandlerRegistry,
}

impl EmbedShared {
    fn receive(&self, event: &MessageEvent) {
        let envelope = match EngineEnvelope::from_value(&event.data) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(origin = %event.origin, error = %e, "Dropping invalid engine message");
                return;
            },
        };

        debug!(
            message_type = %envelope.message_type(),
            origin = %event.origin,
            "Engine message received"
        );
        self.messages
            .lock()
            .expect("lock poisoned")
            .push(envelope.clone());
        self.handlers.dispatch(&envelope);
    }
}

/// Document listener scoped to one frame's content context.
struct FrameListener {
    shared: Weak<EmbedShared>,
}

impl MessageListener for FrameListener {
    fn on_message(&self, event: &MessageEvent) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        // Messages from other frames or the page itself belong to someone else.
        let Some(source) = event.source else {
            return;
        };
        if shared.frame.content_window() != Some(source) {
            return;
        }
        shared.receive(event);
    }
}

/// Embed the Solar Window engine into `document`.
///
/// Validates `options`, builds the load URL from the document's own origin,
/// mounts a borderless frame into the container and starts listening for
/// messages from that frame only.
///
/// # Errors
///
/// - [`EmbedError::MissingContainerId`] if `containerId` is empty.
/// - [`EmbedError::ContainerNotFound`] if the container does not exist.
/// - [`EmbedError::InvalidOrigin`] if the document origin cannot be parsed.
/// - [`EmbedError::Mount`] if the document refuses the frame.
///
/// No frame is attached when an error is returned.
pub fn embed(
    document: Arc<dyn HostDocument>,
    options: &EmbedOptions,
) -> EmbedResult<SolarWindowEmbed> {
    let container_id = options
        .container_id()
        .ok_or(EmbedError::MissingContainerId)?;
    if !document.has_element(container_id) {
        error!(container_id, "Container element not found");
        return Err(EmbedError::ContainerNotFound(container_id.to_string()));
    }

    let origin = document.origin();
    let target = Url::parse(&origin)
        .ok()
        .map(|url| url.origin())
        .filter(url::Origin::is_tuple)
        .map(|o| TargetOrigin::Exact(o.ascii_serialization()))
        .ok_or_else(|| EmbedError::InvalidOrigin(origin.clone()))?;

    let src = build_embed_url(&origin, options);
    let spec = FrameSpec::borderless(
        src.clone(),
        options.effective_width(),
        options.effective_height(),
    );
    let frame = document.mount_frame(container_id, spec)?;

    let shared = Arc::new(EmbedShared {
        frame,
        messages: Mutex::new(Vec::new()),
        handlers: HandlerRegistry::default(),
    });
    let listener = document.add_message_listener(Arc::new(FrameListener {
        shared: Arc::downgrade(&shared),
    }));

    info!(container_id, %src, "Solar Window embedded");
    Ok(SolarWindowEmbed {
        document,
        shared,
        listener: Mutex::new(Some(listener)),
        target,
        src,
    })
}

/// Handle to one embedded engine frame.
///
/// Dropping the handle removes its document listener. The frame itself
/// stays mounted until [`destroy`](Self::destroy) is called or the page
/// removes it.
pub struct SolarWindowEmbed {
    document: Arc<dyn HostDocument>,
    shared: Arc<EmbedShared>,
    listener: Mutex<Option<ListenerId>>,
    target: TargetOrigin,
    src: String,
}

impl std::fmt::Debug for SolarWindowEmbed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolarWindowEmbed")
            .field("src", &self.src)
            .field("target", &self.target)
            .field("messages", &self.message_count())
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}

impl SolarWindowEmbed {
    /// Post a message into the frame, targeted at the frame's load origin.
    ///
    /// Delivery is best-effort: a frame without a content context is
    /// skipped and transport failures are logged, never returned.
    pub fn send_message(&self, message: DashboardMessage) {
        self.send_envelope(&DashboardEnvelope::new(message));
    }

    /// Post a prepared envelope, e.g. one carrying an `auth` token.
    pub fn send_envelope(&self, envelope: &DashboardEnvelope) {
        let message_type = envelope.message.message_type();
        if self.shared.frame.content_window().is_none() {
            debug!(%message_type, "Frame has no content window, message skipped");
            return;
        }

        match self.shared.frame.post_message(envelope.to_value(), &self.target) {
            Ok(()) => debug!(%message_type, target = %self.target, "Message sent to engine"),
            Err(e) => error!(%message_type, error = %e, "Failed to send message to engine"),
        }
    }

    /// Send a `COMMAND`.
    pub fn send_command(&self, command: Command) {
        self.send_message(DashboardMessage::Command(command));
    }

    /// Send a `STATE_REQUEST`. The reply is correlated by type only.
    pub fn request_state(&self) {
        self.send_message(DashboardMessage::StateRequest);
    }

    /// Register a handler. Handlers are never removed implicitly; keep the
    /// returned [`Subscription`] or its id to release it.
    pub fn on_message<F>(&self, filter: impl Into<MessageFilter>, handler: F) -> Subscription
    where
        F: Fn(&EngineEnvelope) + Send + Sync + 'static,
    {
        let handler: MessageHandler = Arc::new(handler);
        let id = self.shared.handlers.register(filter.into(), handler);
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Run `handler` with each `ENGINE_READY` payload.
    pub fn on_ready<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ReadyPayload) + Send + Sync + 'static,
    {
        self.on_message(EngineMessageType::EngineReady, move |envelope| {
            if let EngineMessage::EngineReady(payload) = &envelope.message {
                handler(payload);
            }
        })
    }

    /// Run `handler` with each `STATE_UPDATE` snapshot.
    pub fn on_state_update<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SolarEngineState) + Send + Sync + 'static,
    {
        self.on_message(EngineMessageType::StateUpdate, move |envelope| {
            if let EngineMessage::StateUpdate(state) = &envelope.message {
                handler(state);
            }
        })
    }

    /// Run `handler` with each `INTERACTION` payload.
    pub fn on_interaction<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InteractionPayload) + Send + Sync + 'static,
    {
        self.on_message(EngineMessageType::Interaction, move |envelope| {
            if let EngineMessage::Interaction(payload) = &envelope.message {
                handler(payload);
            }
        })
    }

    /// Release a handler by id. Returns `true` if it was registered.
    pub fn off(&self, id: HandlerId) -> bool {
        self.shared.handlers.unregister(id)
    }

    /// Copy of every valid inbound envelope, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn messages(&self) -> Vec<EngineEnvelope> {
        self.shared.messages.lock().expect("lock poisoned").clone()
    }

    /// Number of inbound envelopes observed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.shared.messages.lock().expect("lock poisoned").len()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.shared.handlers.len()
    }

    /// The owned frame, for resizing and similar page-level work.
    #[must_use]
    pub fn frame(&self) -> Arc<dyn Frame> {
        Arc::clone(&self.shared.frame)
    }

    /// Load URL of the frame.
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Origin outbound messages are targeted at.
    #[must_use]
    pub fn target_origin(&self) -> &TargetOrigin {
        &self.target
    }

    /// Stop listening and remove the frame from the page. Idempotent.
    pub fn destroy(&self) {
        self.remove_listener();
        self.shared.frame.detach();
        info!(src = %self.src, "Solar Window embed destroyed");
    }

    fn remove_listener(&self) {
        let id = self.listener.lock().ok().and_then(|mut l| l.take());
        if let Some(id) = id {
            self.document.remove_message_listener(id);
        }
    }
}

impl Drop for SolarWindowEmbed {
    fn drop(&mut self) {
        self.remove_listener();
    }
}

/// A registered handler. Not released on drop; call
/// [`release`](Self::release) when the handler is no longer wanted.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: HandlerId,
    shared: Weak<EmbedShared>,
}

impl Subscription {
    /// Id accepted by [`SolarWindowEmbed::off`].
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Unregister the handler. Returns `false` if it was already released
    /// or the embed is gone.
    pub fn release(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.handlers.unregister(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solwin_core::{EngineWindow, EventTarget, Location};
    use solwin_loopback::{Browser, LoopbackWindow};
    use solwin_test::{
        ENGINE_ORIGIN, HOST_ORIGIN, engine_ready_value, interaction_value, state_update_value,
        test_state,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Page {
        browser: Browser,
        host: Arc<LoopbackWindow>,
    }

    fn page() -> Page {
        let browser = Browser::new();
        let host = browser.open_document(HOST_ORIGIN);
        host.add_element("c");
        host.add_element("d");
        Page { browser, host }
    }

    impl Page {
        fn embed(&self, container: &str) -> (SolarWindowEmbed, Arc<LoopbackWindow>) {
            let handle = embed(self.host.clone(), &EmbedOptions::new(container)).unwrap();
            let engine = self
                .browser
                .window(handle.frame().content_window().unwrap())
                .unwrap();
            (handle, engine)
        }
    }

    #[test]
    fn test_missing_container_id() {
        let page = page();
        let err = embed(page.host.clone(), &EmbedOptions::default()).unwrap_err();
        assert!(matches!(err, EmbedError::MissingContainerId));
        assert!(page.host.mounted_frames().is_empty());
    }

    #[test]
    fn test_container_not_found_leaves_no_frame() {
        let page = page();
        let err = embed(page.host.clone(), &EmbedOptions::new("nope")).unwrap_err();
        assert!(matches!(err, EmbedError::ContainerNotFound(id) if id == "nope"));
        assert!(page.host.mounted_frames().is_empty());
        assert_eq!(page.host.listener_count(), 0);
    }

    #[test]
    fn test_invalid_origin() {
        let browser = Browser::new();
        let host = browser.open_document("not a url");
        host.add_element("c");
        let err = embed(host.clone(), &EmbedOptions::new("c")).unwrap_err();
        assert!(matches!(err, EmbedError::InvalidOrigin(_)));
        assert!(host.mounted_frames().is_empty());
    }

    #[test]
    fn test_frame_spec_from_options() {
        let page = page();
        let options = EmbedOptions::new("c")
            .with_default_location("303 S Technology Ct")
            .with_height("480px");
        let handle = embed(page.host.clone(), &options).unwrap();

        let spec = handle.frame().spec();
        assert_eq!(spec.src, "https://host.example?location=303%20S%20Technology%20Ct");
        assert!(!spec.src.contains("apiKey"));
        assert_eq!(spec.height, "480px");
        assert_eq!(spec.width, "100%");
        assert!(!spec.border);
        assert!(spec.overflow_hidden);
        assert!(spec.allow_fullscreen);
        assert_eq!(handle.target_origin().as_str(), HOST_ORIGIN);
    }

    #[test]
    fn test_inbound_messages_logged_in_order() {
        let page = page();
        let (handle, engine) = page.embed("c");

        engine
            .post_to_parent(engine_ready_value(), &TargetOrigin::Any)
            .unwrap();
        engine
            .post_to_parent(state_update_value(&test_state()), &TargetOrigin::Any)
            .unwrap();
        engine
            .post_to_parent(interaction_value("pan"), &TargetOrigin::Any)
            .unwrap();
        page.browser.flush();

        let mut messages = handle.messages();
        let types: Vec<_> = messages.iter().map(EngineEnvelope::message_type).collect();
        assert_eq!(
            types,
            vec![
                EngineMessageType::EngineReady,
                EngineMessageType::StateUpdate,
                EngineMessageType::Interaction,
            ]
        );

        messages.clear();
        assert_eq!(handle.messages().len(), 3);
    }

    #[test]
    fn test_invalid_messages_are_not_logged() {
        let page = page();
        let (handle, engine) = page.embed("c");
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        handle.on_message(MessageFilter::All, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        for bad in [
            json!({"type": "NOT_A_TYPE", "payload": null, "timestamp": 1}),
            json!({"type": "ENGINE_READY", "payload": {"version": 1}, "timestamp": 1}),
            json!({"type": "ENGINE_READY", "payload": {"version": "1", "capabilities": []}}),
            json!("plain string"),
        ] {
            engine.post_to_parent(bad, &TargetOrigin::Any).unwrap();
        }
        page.browser.flush();

        assert_eq!(handle.message_count(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_messages_from_page_itself_are_ignored() {
        let page = page();
        let (handle, _engine) = page.embed("c");

        page.host
            .post_to_parent(engine_ready_value(), &TargetOrigin::Any)
            .unwrap();
        page.browser.flush();
        assert_eq!(handle.message_count(), 0);
    }

    #[test]
    fn test_typed_handlers() {
        let page = page();
        let (handle, engine) = page.embed("c");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let ready_seen = Arc::clone(&seen);
        handle.on_ready(move |payload| {
            ready_seen
                .lock()
                .unwrap()
                .push(format!("ready {}", payload.version));
        });
        let state_seen = Arc::clone(&seen);
        handle.on_state_update(move |state| {
            state_seen
                .lock()
                .unwrap()
                .push(format!("state {:?}", state.address));
        });
        let interaction_seen = Arc::clone(&seen);
        handle.on_interaction(move |payload| {
            interaction_seen
                .lock()
                .unwrap()
                .push(format!("interaction {}", payload.action));
        });

        engine
            .post_to_parent(engine_ready_value(), &TargetOrigin::Any)
            .unwrap();
        engine
            .post_to_parent(state_update_value(&test_state()), &TargetOrigin::Any)
            .unwrap();
        engine
            .post_to_parent(interaction_value("zoom"), &TargetOrigin::Any)
            .unwrap();
        page.browser.flush();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "ready 1.0.0".to_string(),
                "state Some(\"303 S Technology Ct\")".to_string(),
                "interaction zoom".to_string(),
            ]
        );
    }

    #[test]
    fn test_subscription_release_and_off() {
        let page = page();
        let (handle, engine) = page.embed("c");
        let hits = Arc::new(AtomicUsize::new(0));

        let first_hits = Arc::clone(&hits);
        let first = handle.on_message(MessageFilter::All, move |_| {
            first_hits.fetch_add(1, Ordering::SeqCst);
        });
        let second_hits = Arc::clone(&hits);
        let second = handle.on_message(EngineMessageType::EngineReady, move |_| {
            second_hits.fetch_add(10, Ordering::SeqCst);
        });
        assert_eq!(handle.handler_count(), 2);

        assert!(first.release());
        assert!(!first.release());
        assert!(handle.off(second.id()));
        assert_eq!(handle.handler_count(), 0);

        engine
            .post_to_parent(engine_ready_value(), &TargetOrigin::Any)
            .unwrap();
        page.browser.flush();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(handle.message_count(), 1);
    }

    #[test]
    fn test_send_message_targets_frame_origin() {
        let browser = Browser::new();
        let host = browser.open_document(HOST_ORIGIN);
        host.add_element("c");
        let handle = embed(host.clone(), &EmbedOptions::new("c")).unwrap();
        let engine = browser
            .window(handle.frame().content_window().unwrap())
            .unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        engine.add_message_listener(Arc::new(move |event: &MessageEvent| {
            received_clone.lock().unwrap().push(event.clone());
        }));

        handle.send_command(Command::Refresh);
        handle.request_state();
        handle.send_envelope(
            &DashboardEnvelope::new(DashboardMessage::Command(Command::Initialize))
                .with_auth("token-1"),
        );
        browser.flush();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 3);
        assert_eq!(received[0].data, json!({"type": "COMMAND", "payload": "REFRESH"}));
        assert_eq!(received[1].data, json!({"type": "STATE_REQUEST", "payload": null}));
        assert_eq!(received[2].data["auth"], "token-1");
        assert!(received.iter().all(|e| e.data.get("timestamp").is_none()));
        assert!(received.iter().all(|e| e.origin == HOST_ORIGIN));
    }

    #[test]
    fn test_cross_origin_engine_document_does_not_receive() {
        // A document at another origin is not reached by the exact target.
        let browser = Browser::new();
        let host = browser.open_document(HOST_ORIGIN);
        host.add_element("c");
        let handle = embed(host.clone(), &EmbedOptions::new("c")).unwrap();

        let other = host
            .mount_frame("c", FrameSpec::borderless(ENGINE_ORIGIN, "1", "1"))
            .unwrap();
        let other_engine = browser.window(other.content_window().unwrap()).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        other_engine.add_message_listener(Arc::new(move |_: &MessageEvent| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        }));

        other
            .post_message(json!({"type": "STATE_REQUEST"}), handle.target_origin())
            .unwrap();
        browser.flush();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_destroy_detaches_and_stops_listening() {
        let page = page();
        let (handle, engine) = page.embed("c");
        assert_eq!(page.host.listener_count(), 1);

        handle.destroy();
        handle.destroy();
        assert_eq!(page.host.listener_count(), 0);
        assert!(page.host.mounted_frames().is_empty());
        assert!(handle.frame().content_window().is_none());
        assert!(
            engine
                .post_to_parent(engine_ready_value(), &TargetOrigin::Any)
                .is_err()
        );

        // Sending after destroy is a logged no-op.
        handle.request_state();
        assert_eq!(page.browser.pending(), 0);
    }

    #[test]
    fn test_drop_removes_listener() {
        let page = page();
        let (handle, _engine) = page.embed("c");
        assert_eq!(page.host.listener_count(), 1);
        drop(handle);
        assert_eq!(page.host.listener_count(), 0);
        assert_eq!(page.host.mounted_frames().len(), 1);
    }

    #[test]
    fn test_two_embeds_are_isolated() {
        solwin_test::init_test_logging();
        let page = page();
        let (a, engine_a) = page.embed("c");
        let (b, _engine_b) = page.embed("d");

        let b_hits = Arc::new(AtomicUsize::new(0));
        let b_hits_clone = Arc::clone(&b_hits);
        b.on_message(MessageFilter::All, move |_| {
            b_hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        let a_hits = Arc::new(AtomicUsize::new(0));
        let a_hits_clone = Arc::clone(&a_hits);
        a.on_message(MessageFilter::All, move |_| {
            a_hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let state = SolarEngineState::new().with_location(Location::new(1.0, 2.0));
        engine_a
            .post_to_parent(state_update_value(&state), &TargetOrigin::Any)
            .unwrap();
        page.browser.flush();

        assert_eq!(a.message_count(), 1);
        assert_eq!(a_hits.load(Ordering::SeqCst), 1);
        assert_eq!(b.message_count(), 0);
        assert_eq!(b_hits.load(Ordering::SeqCst), 0);
    }
}
