//! Handler registry for inbound engine messages.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace, warn};
use uuid::Uuid;

use solwin_core::{EngineEnvelope, EngineMessageType};

/// Callback invoked with each matching inbound envelope.
pub type MessageHandler = Arc<dyn Fn(&EngineEnvelope) + Send + Sync>;

/// Which inbound messages a handler receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFilter {
    /// Every message, after the type-specific handlers ran.
    All,
    /// Only messages of one type.
    Only(EngineMessageType),
}

impl MessageFilter {
    /// Sentinel name of [`MessageFilter::All`].
    pub const ALL: &'static str = "all";

    /// Parse a filter name: `"all"` or an engine message type.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == Self::ALL {
            return Some(Self::All);
        }
        EngineMessageType::parse(raw).map(Self::Only)
    }

    /// Name of the filter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => Self::ALL,
            Self::Only(message_type) => message_type.as_str(),
        }
    }
}

impl From<EngineMessageType> for MessageFilter {
    fn from(message_type: EngineMessageType) -> Self {
        Self::Only(message_type)
    }
}

impl fmt::Display for MessageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration handle for a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

struct Registration {
    id: HandlerId,
    filter: MessageFilter,
    handler: MessageHandler,
}

/// Ordered handler table.
///
/// Dispatch snapshots the matching handlers before invoking them, so a
/// handler may register or release handlers without deadlocking; such
/// changes take effect from the next message.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: RwLock<Vec<Registration>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handler_count", &self.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn register(&self, filter: MessageFilter, handler: MessageHandler) -> HandlerId {
        let id = HandlerId::new();
        self.handlers
            .write()
            .expect("lock poisoned")
            .push(Registration {
                id,
                filter,
                handler,
            });
        debug!(%filter, "Handler registered");
        id
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn unregister(&self, id: HandlerId) -> bool {
        let removed = {
            let mut handlers = self.handlers.write().expect("lock poisoned");
            handlers
                .iter()
                .position(|r| r.id == id)
                .map(|index| handlers.remove(index))
        };

        // The closure may own captures with their own Drop; run it unlocked.
        match removed {
            Some(registration) => {
                debug!(filter = %registration.filter, "Handler released");
                true
            },
            None => false,
        }
    }

    /// Invoke type-specific handlers, then `All` handlers, each group in
    /// registration order. Returns how many handlers ran to completion.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn dispatch(&self, envelope: &EngineEnvelope) -> usize {
        let message_type = envelope.message_type();
        let selected: Vec<(HandlerId, MessageHandler)> = {
            let handlers = self.handlers.read().expect("lock poisoned");
            let typed = handlers
                .iter()
                .filter(|r| r.filter == MessageFilter::Only(message_type));
            let all = handlers.iter().filter(|r| r.filter == MessageFilter::All);
            typed
                .chain(all)
                .map(|r| (r.id, Arc::clone(&r.handler)))
                .collect()
        };

        let mut completed: usize = 0;
        for (id, handler) in selected {
            trace!(handler_id = ?id, %message_type, "Invoking handler");
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(envelope);
            }));
            match result {
                Ok(()) => completed = completed.saturating_add(1),
                Err(e) => warn!(
                    handler_id = ?id,
                    %message_type,
                    error = ?e,
                    "Message handler panicked"
                ),
            }
        }
        completed
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn len(&self) -> usize {
        self.handlers.read().expect("lock poisoned").len()
    }
}
