//! Solwin Embed - the host page's half of the frame protocol.
//!
//! [`embed`] mounts the Solar Window engine into a container element of a
//! host document and returns a [`SolarWindowEmbed`] handle. The handle
//! sends commands down into the frame, keeps a log of every valid message
//! the frame sent up, and fans those messages out to registered handlers.
//!
//! Several embeds can live on one page: each handle only accepts messages
//! whose source is its own frame's content window.
//!
//! # Example
//!
//! ```rust
//! use solwin_core::{Command, EngineMessageType};
//! use solwin_embed::{EmbedOptions, MessageFilter, embed};
//! use solwin_loopback::Browser;
//!
//! # fn main() -> Result<(), solwin_embed::EmbedError> {
//! let browser = Browser::new();
//! let page = browser.open_document("https://host.example");
//! page.add_element("solar-window-container");
//!
//! let handle = embed(
//!     page,
//!     &EmbedOptions::new("solar-window-container").with_default_location("Boulder, CO"),
//! )?;
//!
//! let ready = handle.on_message(EngineMessageType::EngineReady, |envelope| {
//!     println!("engine ready at {}", envelope.timestamp);
//! });
//! handle.on_message(MessageFilter::All, |envelope| {
//!     println!("{}", envelope.message_type());
//! });
//!
//! handle.send_command(Command::Initialize);
//! ready.release();
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod embed;
mod error;
mod options;
mod registry;

pub use embed::{SolarWindowEmbed, Subscription, embed};
pub use error::{EmbedError, EmbedResult};
pub use options::{DEFAULT_HEIGHT, DEFAULT_WIDTH, EmbedOptions, build_embed_url};
pub use registry::{HandlerId, MessageFilter, MessageHandler};
