//! Prelude module - commonly used types for convenient import.
//!
//! Use `use solwin_embed::prelude::*;` to import all essential types.

pub use crate::{
    EmbedError, EmbedOptions, EmbedResult, HandlerId, MessageFilter, SolarWindowEmbed,
    Subscription, embed,
};
