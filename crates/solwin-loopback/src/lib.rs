//! Solwin Loopback - an in-process browser for the frame protocol.
//!
//! [`Browser`] keeps a table of browsing contexts (top-level documents and
//! frame contents) and a FIFO queue of posted messages. Posting never
//! delivers synchronously; [`Browser::flush`] drains the queue, applying the
//! same rules a browser does:
//!
//! - a message whose target origin does not admit the receiver's origin is
//!   silently dropped;
//! - a message to a removed context is dropped;
//! - per-sender order is preserved.
//!
//! Both protocol endpoints can therefore run in one process, for demos and
//! for tests that need real multiplexing between several frames.
//!
//! # Example
//!
//! ```rust
//! use solwin_core::{Frame, FrameSpec, HostDocument};
//! use solwin_loopback::Browser;
//!
//! let browser = Browser::new();
//! let host = browser.open_document("https://host.example");
//! host.add_element("mount");
//!
//! let frame = host
//!     .mount_frame("mount", FrameSpec::borderless("https://host.example", "100%", "600px"))
//!     .unwrap();
//! let engine = browser.window(frame.content_window().unwrap()).unwrap();
//! assert_eq!(engine.origin(), "https://host.example");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod browser;
mod frame;
mod window;

pub use browser::{Browser, MAX_FLUSH_DELIVERIES};
pub use frame::LoopbackFrame;
pub use window::LoopbackWindow;
