//! Solwin Test - shared test utilities for the frame protocol crates.
//!
//! Add to a crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! solwin-test.workspace = true
//! ```
//!
//! Then drive an engine channel against a recording window:
//!
//! ```rust,ignore
//! use solwin_test::RecordingWindow;
//!
//! let window = RecordingWindow::framed();
//! window.deliver(serde_json::json!({"type": "STATE_REQUEST"}), "https://host.example");
//! assert_eq!(window.posted_envelopes().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

/// Install a test-writer subscriber honoring `RUST_LOG`. Safe to call from
/// every test; only the first call installs anything.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
