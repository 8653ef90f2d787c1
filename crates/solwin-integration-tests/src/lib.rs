//! Integration tests for the Solar Window frame protocol.
//!
//! This crate is `publish = false` and has no library code. The tests in
//! `tests/` run an engine channel inside a real embed over the loopback
//! browser.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
