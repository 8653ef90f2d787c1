//! Mock implementations for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use solwin_core::{
    EngineEnvelope, EngineWindow, EventTarget, ListenerId, MessageEvent, MessageListener,
    TargetOrigin, TransportError, TransportResult,
};

/// How a [`RecordingWindow`] answers the top-level check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevel {
    /// The document is its own top-level context.
    Own,
    /// The document is inside a frame.
    Framed,
    /// Inspecting the top-level context throws.
    Denied,
}

/// A message the engine posted to its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// Posted value.
    pub data: Value,
    /// Requested target origin.
    pub target: TargetOrigin,
}

/// Engine window that records every post and lets tests deliver inbound
/// events synchronously.
pub struct RecordingWindow {
    top_level: TopLevel,
    posted: Mutex<Vec<PostedMessage>>,
    listeners: Mutex<Vec<(ListenerId, Arc<dyn MessageListener>)>>,
    reloads: AtomicUsize,
    parent_gone: AtomicBool,
}

impl std::fmt::Debug for RecordingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingWindow")
            .field("top_level", &self.top_level)
            .field("listeners", &self.listener_count())
            .field("reloads", &self.reload_count())
            .finish_non_exhaustive()
    }
}

impl RecordingWindow {
    /// Create a window with the given top-level behaviour.
    #[must_use]
    pub fn new(top_level: TopLevel) -> Arc<Self> {
        Arc::new(Self {
            top_level,
            posted: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            reloads: AtomicUsize::new(0),
            parent_gone: AtomicBool::new(false),
        })
    }

    /// A window inside a same-origin frame.
    #[must_use]
    pub fn framed() -> Arc<Self> {
        Self::new(TopLevel::Framed)
    }

    /// A top-level window (not embedded).
    #[must_use]
    pub fn top_level() -> Arc<Self> {
        Self::new(TopLevel::Own)
    }

    /// A window inside a cross-origin frame; the top-level check fails.
    #[must_use]
    pub fn cross_origin() -> Arc<Self> {
        Self::new(TopLevel::Denied)
    }

    /// Deliver an inbound message to every installed listener.
    pub fn deliver(&self, data: Value, origin: &str) {
        let event = MessageEvent::new(data, origin, None);
        let listeners: Vec<Arc<dyn MessageListener>> = self
            .listeners
            .lock()
            .map(|l| l.iter().map(|(_, listener)| Arc::clone(listener)).collect())
            .unwrap_or_default();

        for listener in listeners {
            listener.on_message(&event);
        }
    }

    /// Everything posted so far.
    #[must_use]
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Posted values parsed as engine envelopes. Unparseable posts are skipped.
    #[must_use]
    pub fn posted_envelopes(&self) -> Vec<EngineEnvelope> {
        self.posted()
            .iter()
            .filter_map(|p| EngineEnvelope::from_value(&p.data).ok())
            .collect()
    }

    /// Forget recorded posts.
    pub fn clear_posted(&self) {
        if let Ok(mut posted) = self.posted.lock() {
            posted.clear();
        }
    }

    /// Number of installed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or_default()
    }

    /// Number of reloads requested.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    /// Make every post fail as if the parent context were gone.
    pub fn set_parent_gone(&self, gone: bool) {
        self.parent_gone.store(gone, Ordering::SeqCst);
    }
}

impl EventTarget for RecordingWindow {
    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId {
        let id = ListenerId::new();
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, listener));
        }
        id
    }

    fn remove_message_listener(&self, id: ListenerId) -> bool {
        self.listeners.lock().is_ok_and(|mut listeners| {
            let before = listeners.len();
            listeners.retain(|(existing, _)| *existing != id);
            listeners.len() != before
        })
    }
}

impl EngineWindow for RecordingWindow {
    fn is_top_level(&self) -> TransportResult<bool> {
        match self.top_level {
            TopLevel::Own => Ok(true),
            TopLevel::Framed => Ok(false),
            TopLevel::Denied => Err(TransportError::IntrospectionDenied(
                "blocked a frame from accessing a cross-origin frame".into(),
            )),
        }
    }

    fn post_to_parent(&self, data: Value, target: &TargetOrigin) -> TransportResult<()> {
        if self.parent_gone.load(Ordering::SeqCst) {
            return Err(TransportError::TargetGone);
        }
        debug!(%target, "RecordingWindow captured post");
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(PostedMessage {
                data,
                target: target.clone(),
            });
        }
        Ok(())
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}
