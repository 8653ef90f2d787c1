//! Abstraction over the cross-document message primitive.
//!
//! The engine and the host never share memory. All they can do is post a
//! JSON value to another browsing context and receive [`MessageEvent`]s on
//! listeners they installed. These traits model exactly that surface so
//! the protocol endpoints can run against a real page binding or an
//! in-process simulation.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::error::TransportResult;
use crate::origin::TargetOrigin;

/// Identity of a browsing context (a top-level window or a frame's content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(Uuid);

impl WindowId {
    /// Allocate a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// A delivered cross-document message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// The posted value.
    pub data: Value,
    /// Origin of the sending document, as reported by the platform.
    pub origin: String,
    /// Browsing context that posted the message, if still known.
    pub source: Option<WindowId>,
}

impl MessageEvent {
    /// Build an event.
    #[must_use]
    pub fn new(data: Value, origin: impl Into<String>, source: Option<WindowId>) -> Self {
        Self {
            data,
            origin: origin.into(),
            source,
        }
    }
}

/// Receives message events delivered to a document.
///
/// Implementations must return quickly; delivery to other listeners waits.
pub trait MessageListener: Send + Sync {
    /// Called once per delivered event.
    fn on_message(&self, event: &MessageEvent);
}

impl<F> MessageListener for F
where
    F: Fn(&MessageEvent) + Send + Sync,
{
    fn on_message(&self, event: &MessageEvent) {
        self(event);
    }
}

/// Handle for an installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Allocate a fresh handle.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Something message listeners can be attached to.
pub trait EventTarget: Send + Sync {
    /// Install a listener for message events.
    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId;

    /// Remove a listener. Returns `true` if it was installed.
    fn remove_message_listener(&self, id: ListenerId) -> bool;
}

/// The engine document's view of its own window.
pub trait EngineWindow: EventTarget {
    /// Whether this document is its own top-level browsing context.
    ///
    /// # Errors
    ///
    /// Fails when the top-level context cannot be inspected, which happens
    /// under cross-origin embedding.
    fn is_top_level(&self) -> TransportResult<bool>;

    /// Post a value to the parent browsing context.
    ///
    /// # Errors
    ///
    /// Fails when the parent is gone or the platform rejects the message.
    fn post_to_parent(&self, data: Value, target: &TargetOrigin) -> TransportResult<()>;

    /// Reload the whole document.
    fn reload(&self);
}

/// Presentation attributes of an embedded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    /// Load URL.
    pub src: String,
    /// CSS width.
    pub width: String,
    /// CSS height.
    pub height: String,
    /// Whether a border is drawn.
    pub border: bool,
    /// Whether overflow is hidden.
    pub overflow_hidden: bool,
    /// Whether the frame may go full screen.
    pub allow_fullscreen: bool,
}

impl FrameSpec {
    /// Borderless, overflow-hidden, full-screen capable frame.
    #[must_use]
    pub fn borderless(
        src: impl Into<String>,
        width: impl Into<String>,
        height: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            width: width.into(),
            height: height.into(),
            border: false,
            overflow_hidden: true,
            allow_fullscreen: true,
        }
    }
}

/// A frame element owned by the host page.
pub trait Frame: Send + Sync + fmt::Debug {
    /// Current presentation attributes.
    fn spec(&self) -> FrameSpec;

    /// The frame's content browsing context, if it has one.
    fn content_window(&self) -> Option<WindowId>;

    /// Post a value into the frame's content context.
    ///
    /// # Errors
    ///
    /// Fails when the frame was removed or the platform rejects the message.
    fn post_message(&self, data: Value, target: &TargetOrigin) -> TransportResult<()>;

    /// Change the frame's CSS size.
    fn resize(&self, width: &str, height: &str);

    /// Remove the frame from the page. Its content context goes away.
    fn detach(&self);
}

/// The host page's document.
pub trait HostDocument: EventTarget {
    /// Origin the host document was served from.
    fn origin(&self) -> String;

    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Create a frame and append it to the element with `container_id`.
    ///
    /// # Errors
    ///
    /// Fails when the container does not exist.
    fn mount_frame(&self, container_id: &str, spec: FrameSpec) -> TransportResult<Arc<dyn Frame>>;
}
