//! Browsing context table and delivery queue.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, trace, warn};

use solwin_core::{
    ListenerId, MessageEvent, MessageListener, TargetOrigin, TransportError, TransportResult,
    WindowId,
};

use crate::window::LoopbackWindow;

/// Upper bound on deliveries performed by one [`Browser::flush`], so two
/// listeners that answer each other forever cannot hang the caller.
pub const MAX_FLUSH_DELIVERIES: usize = 10_000;

/// One browsing context.
pub(crate) struct Context {
    pub(crate) origin: String,
    pub(crate) parent: Option<WindowId>,
    pub(crate) elements: HashSet<String>,
    pub(crate) frames: Vec<WindowId>,
    pub(crate) listeners: Vec<(ListenerId, Arc<dyn MessageListener>)>,
    pub(crate) reloads: usize,
}

impl Context {
    fn new(origin: String, parent: Option<WindowId>) -> Self {
        Self {
            origin,
            parent,
            elements: HashSet::new(),
            frames: Vec::new(),
            listeners: Vec::new(),
            reloads: 0,
        }
    }
}

struct Delivery {
    to: WindowId,
    target: TargetOrigin,
    event: MessageEvent,
}

/// Shared state behind a [`Browser`].
#[derive(Default)]
pub(crate) struct BrowserInner {
    contexts: Mutex<HashMap<WindowId, Context>>,
    queue: Mutex<VecDeque<Delivery>>,
}

impl BrowserInner {
    /// Run `f` against a context, if it still exists.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn with_context<R>(
        &self,
        id: WindowId,
        f: impl FnOnce(&mut Context) -> R,
    ) -> Option<R> {
        let mut contexts = self.contexts.lock().expect("lock poisoned");
        contexts.get_mut(&id).map(f)
    }

    pub(crate) fn insert_context(&self, origin: String, parent: Option<WindowId>) -> WindowId {
        let id = WindowId::new();
        let mut contexts = self.contexts.lock().expect("lock poisoned");
        contexts.insert(id, Context::new(origin, parent));
        if let Some(parent_ctx) = parent.and_then(|p| contexts.get_mut(&p)) {
            parent_ctx.frames.push(id);
        }
        id
    }

    /// Remove a context and, recursively, every frame inside it.
    pub(crate) fn remove_context(&self, id: WindowId) -> bool {
        let mut removed_listeners = Vec::new();
        let existed = {
            let mut contexts = self.contexts.lock().expect("lock poisoned");
            let Some(ctx) = contexts.remove(&id) else {
                return false;
            };
            if let Some(parent_ctx) = ctx.parent.and_then(|p| contexts.get_mut(&p)) {
                parent_ctx.frames.retain(|f| *f != id);
            }

            let mut pending: Vec<WindowId> = ctx.frames.clone();
            removed_listeners.extend(ctx.listeners);
            while let Some(child) = pending.pop() {
                if let Some(child_ctx) = contexts.remove(&child) {
                    pending.extend(child_ctx.frames);
                    removed_listeners.extend(child_ctx.listeners);
                }
            }
            true
        };
        // Listeners may own resources whose drop re-enters the browser.
        drop(removed_listeners);
        existed
    }

    pub(crate) fn origin_of(&self, id: WindowId) -> Option<String> {
        self.with_context(id, |ctx| ctx.origin.clone())
    }

    pub(crate) fn parent_of(&self, id: WindowId) -> Option<Option<WindowId>> {
        self.with_context(id, |ctx| ctx.parent)
    }

    /// Queue a message from `from` to `to`.
    pub(crate) fn post(
        &self,
        from: WindowId,
        to: WindowId,
        data: Value,
        target: &TargetOrigin,
    ) -> TransportResult<()> {
        let sender_origin = self.origin_of(from).ok_or(TransportError::TargetGone)?;
        if self.origin_of(to).is_none() {
            return Err(TransportError::TargetGone);
        }

        trace!(%from, %to, %target, "Queued message");
        self.queue
            .lock()
            .expect("lock poisoned")
            .push_back(Delivery {
                to,
                target: target.clone(),
                event: MessageEvent::new(data, sender_origin, Some(from)),
            });
        Ok(())
    }

    fn deliver_next(&self) -> Option<bool> {
        let delivery = self.queue.lock().expect("lock poisoned").pop_front()?;

        let listeners = self.with_context(delivery.to, |ctx| {
            if delivery.target.admits(&ctx.origin) {
                Some(
                    ctx.listeners
                        .iter()
                        .map(|(_, listener)| Arc::clone(listener))
                        .collect::<Vec<_>>(),
                )
            } else {
                debug!(
                    target = %delivery.target,
                    receiver = %ctx.origin,
                    "Target origin does not match receiver, message dropped"
                );
                None
            }
        });

        let Some(Some(listeners)) = listeners else {
            return Some(false);
        };

        for listener in listeners {
            listener.on_message(&delivery.event);
        }
        Some(true)
    }
}

/// An in-process browser holding any number of documents and frames.
///
/// Cloning yields another handle to the same browser. Windows and frames
/// only hold weak references; once every `Browser` handle is gone, posts
/// fail with [`TransportError::TargetGone`].
#[derive(Clone, Default)]
pub struct Browser {
    inner: Arc<BrowserInner>,
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("contexts", &self.context_count())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Browser {
    /// Create an empty browser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a top-level document served from `origin`.
    #[must_use]
    pub fn open_document(&self, origin: impl Into<String>) -> Arc<LoopbackWindow> {
        let id = self.inner.insert_context(origin.into(), None);
        Arc::new(LoopbackWindow::new(Arc::downgrade(&self.inner), id))
    }

    /// Handle to an existing browsing context.
    #[must_use]
    pub fn window(&self, id: WindowId) -> Option<Arc<LoopbackWindow>> {
        self.inner
            .origin_of(id)
            .map(|_| Arc::new(LoopbackWindow::new(Arc::downgrade(&self.inner), id)))
    }

    /// Deliver queued messages, including those posted by listeners while
    /// flushing. Returns the number of messages handed to a document.
    pub fn flush(&self) -> usize {
        let mut delivered: usize = 0;
        for _ in 0..MAX_FLUSH_DELIVERIES {
            match self.inner.deliver_next() {
                Some(true) => delivered = delivered.saturating_add(1),
                Some(false) => {},
                None => return delivered,
            }
        }
        warn!(
            limit = MAX_FLUSH_DELIVERIES,
            remaining = self.pending(),
            "Flush limit reached, messages left queued"
        );
        delivered
    }

    /// Number of queued messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().expect("lock poisoned").len()
    }

    /// Number of live browsing contexts.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.inner.contexts.lock().expect("lock poisoned").len()
    }
}
