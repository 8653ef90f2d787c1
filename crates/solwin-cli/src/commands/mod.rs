//! Subcommand handlers.

pub(crate) mod config;
pub(crate) mod demo;
pub(crate) mod rate;
pub(crate) mod region;
pub(crate) mod serve;
