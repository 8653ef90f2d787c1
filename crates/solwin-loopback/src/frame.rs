//! Frame elements.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Weak};

use serde_json::Value;
use tracing::debug;

use solwin_core::{Frame, FrameSpec, TargetOrigin, TransportError, TransportResult, WindowId};

use crate::browser::BrowserInner;

/// A frame element mounted in a loopback document.
#[derive(Debug)]
pub struct LoopbackFrame {
    browser: Weak<BrowserInner>,
    parent: WindowId,
    content: WindowId,
    spec: Mutex<FrameSpec>,
    detached: AtomicBool,
}

impl LoopbackFrame {
    pub(crate) fn new(
        browser: Weak<BrowserInner>,
        parent: WindowId,
        content: WindowId,
        spec: FrameSpec,
    ) -> Self {
        Self {
            browser,
            parent,
            content,
            spec: Mutex::new(spec),
            detached: AtomicBool::new(false),
        }
    }

    /// Whether [`Frame::detach`] has been called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

impl Frame for LoopbackFrame {
    fn spec(&self) -> FrameSpec {
        self.spec.lock().map(|s| s.clone()).unwrap_or_else(|e| e.into_inner().clone())
    }

    fn content_window(&self) -> Option<WindowId> {
        if self.is_detached() {
            return None;
        }
        let browser = self.browser.upgrade()?;
        browser.origin_of(self.content).map(|_| self.content)
    }

    fn post_message(&self, data: Value, target: &TargetOrigin) -> TransportResult<()> {
        if self.is_detached() {
            return Err(TransportError::TargetGone);
        }
        let browser = self.browser.upgrade().ok_or(TransportError::TargetGone)?;
        browser.post(self.parent, self.content, data, target)
    }

    fn resize(&self, width: &str, height: &str) {
        if let Ok(mut spec) = self.spec.lock() {
            spec.width = width.to_string();
            spec.height = height.to_string();
        }
    }

    fn detach(&self) {
        if self.detached.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(browser) = self.browser.upgrade() {
            browser.remove_context(self.content);
        }
        debug!(content = %self.content, "Frame detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Browser;
    use solwin_core::HostDocument;

    #[test]
    fn test_resize_updates_spec() {
        let browser = Browser::new();
        let host = browser.open_document("https://host.example");
        host.add_element("c");
        let frame = host
            .mount_frame("c", FrameSpec::borderless("https://e.example", "100%", "600px"))
            .unwrap();

        frame.resize("800px", "400px");
        let spec = frame.spec();
        assert_eq!(spec.width, "800px");
        assert_eq!(spec.height, "400px");
        assert_eq!(spec.src, "https://e.example");
    }

    #[test]
    fn test_detach_is_idempotent() {
        let browser = Browser::new();
        let host = browser.open_document("https://host.example");
        host.add_element("c");
        let frame = host
            .mount_frame("c", FrameSpec::borderless("https://e.example", "1", "1"))
            .unwrap();

        frame.detach();
        frame.detach();
        assert!(host.mounted_frames().is_empty());
        assert_eq!(browser.context_count(), 1);
    }
}
