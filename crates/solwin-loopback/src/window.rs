//! Document handles.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tracing::debug;
use url::Url;

use solwin_core::{
    EngineWindow, EventTarget, Frame, FrameSpec, HostDocument, ListenerId, MessageListener,
    TargetOrigin, TransportError, TransportResult, WindowId,
};

use crate::browser::BrowserInner;
use crate::frame::LoopbackFrame;

/// Origin reported for documents loaded from an unparseable URL.
const OPAQUE_ORIGIN: &str = "null";

/// Handle to one browsing context inside a [`Browser`](crate::Browser).
///
/// The same handle serves as the host page's document and as the engine's
/// own window; which trait a caller uses decides the role.
#[derive(Debug)]
pub struct LoopbackWindow {
    browser: Weak<BrowserInner>,
    id: WindowId,
}

impl LoopbackWindow {
    pub(crate) fn new(browser: Weak<BrowserInner>, id: WindowId) -> Self {
        Self { browser, id }
    }

    /// Identity of this browsing context.
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Create an element with `id` that frames can be mounted into.
    pub fn add_element(&self, id: impl Into<String>) {
        let id = id.into();
        self.with_context(|ctx| {
            ctx.elements.insert(id);
        });
    }

    /// How many times the document asked to be reloaded.
    #[must_use]
    pub fn reload_count(&self) -> usize {
        self.with_context(|ctx| ctx.reloads).unwrap_or_default()
    }

    /// Content contexts of the frames mounted in this document.
    #[must_use]
    pub fn mounted_frames(&self) -> Vec<WindowId> {
        self.with_context(|ctx| ctx.frames.clone())
            .unwrap_or_default()
    }

    /// Number of installed message listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.with_context(|ctx| ctx.listeners.len())
            .unwrap_or_default()
    }

    /// Close the document, removing it and every frame inside it.
    pub fn close(&self) {
        if let Some(browser) = self.browser.upgrade() {
            browser.remove_context(self.id);
        }
    }

    fn with_context<R>(&self, f: impl FnOnce(&mut crate::browser::Context) -> R) -> Option<R> {
        self.browser.upgrade()?.with_context(self.id, f)
    }

    /// Origin of the top-most ancestor.
    fn top_origin(browser: &BrowserInner, mut id: WindowId) -> Option<String> {
        while let Some(parent) = browser.parent_of(id)? {
            id = parent;
        }
        browser.origin_of(id)
    }
}

impl EventTarget for LoopbackWindow {
    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) -> ListenerId {
        let id = ListenerId::new();
        self.with_context(|ctx| ctx.listeners.push((id, listener)));
        id
    }

    fn remove_message_listener(&self, id: ListenerId) -> bool {
        let removed = self.with_context(|ctx| {
            ctx.listeners
                .iter()
                .position(|(existing, _)| *existing == id)
                .map(|index| ctx.listeners.remove(index))
        });
        // Dropped here, after the browser lock is released.
        matches!(removed, Some(Some(_)))
    }
}

impl EngineWindow for LoopbackWindow {
    fn is_top_level(&self) -> TransportResult<bool> {
        let browser = self.browser.upgrade().ok_or(TransportError::TargetGone)?;
        let parent = browser.parent_of(self.id).ok_or(TransportError::TargetGone)?;
        if parent.is_none() {
            return Ok(true);
        }

        let own = browser.origin_of(self.id).ok_or(TransportError::TargetGone)?;
        let top = Self::top_origin(&browser, self.id).ok_or(TransportError::TargetGone)?;
        if own == top {
            Ok(false)
        } else {
            Err(TransportError::IntrospectionDenied(format!(
                "a frame at {own} may not inspect the top-level context at {top}"
            )))
        }
    }

    fn post_to_parent(&self, data: Value, target: &TargetOrigin) -> TransportResult<()> {
        let browser = self.browser.upgrade().ok_or(TransportError::TargetGone)?;
        let parent = browser.parent_of(self.id).ok_or(TransportError::TargetGone)?;
        // A top-level document is its own parent.
        browser.post(self.id, parent.unwrap_or(self.id), data, target)
    }

    fn reload(&self) {
        debug!(window = %self.id, "Reload requested");
        self.with_context(|ctx| ctx.reloads = ctx.reloads.saturating_add(1));
    }
}

impl HostDocument for LoopbackWindow {
    fn origin(&self) -> String {
        self.with_context(|ctx| ctx.origin.clone())
            .unwrap_or_else(|| OPAQUE_ORIGIN.to_string())
    }

    fn has_element(&self, id: &str) -> bool {
        self.with_context(|ctx| ctx.elements.contains(id))
            .unwrap_or(false)
    }

    fn mount_frame(&self, container_id: &str, spec: FrameSpec) -> TransportResult<Arc<dyn Frame>> {
        let browser = self.browser.upgrade().ok_or(TransportError::TargetGone)?;
        if !self.has_element(container_id) {
            return Err(TransportError::NoSuchElement(container_id.to_string()));
        }

        let origin = Url::parse(&spec.src).map_or_else(
            |_| OPAQUE_ORIGIN.to_string(),
            |url| url.origin().ascii_serialization(),
        );
        let content = browser.insert_context(origin, Some(self.id));
        debug!(
            container = container_id,
            src = %spec.src,
            content = %content,
            "Mounted frame"
        );

        Ok(Arc::new(LoopbackFrame::new(
            Arc::downgrade(&browser),
            self.id,
            content,
            spec,
        )))
    }
}
