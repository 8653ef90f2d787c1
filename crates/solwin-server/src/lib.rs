//! Solwin Server - HTTP delivery boundary.
//!
//! Serves the embedding helper script to arbitrary third-party pages with
//! permissive cross-origin headers, answers its pre-flight requests, and
//! exposes the latest regional electricity rate as JSON.
//!
//! | Route | Response |
//! |---|---|
//! | `GET /lib/embed.js` | helper script, CORS and cache headers |
//! | `OPTIONS /lib/embed.js` | empty, CORS headers |
//! | `GET /api/rates/{state}` | latest [`RateRecord`](solwin_regional::RateRecord) |
//! | `GET /health` | `ok` |

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod app;
mod error;
mod handlers;
mod state;

pub use app::{build_router, run};
pub use error::{ServerError, ServerResult};
pub use handlers::EMBED_SCRIPT;
pub use state::{AppState, DEFAULT_CACHE_MAX_AGE_SECS, ServerOptions};
