//! Core logic for the QR / link safety bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging port
//! implemented in the adapter crate.

pub mod classifier;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod formatting;
pub mod handler;
pub mod logging;
pub mod messaging;
pub mod routing;
pub mod utils;

pub use errors::{Error, Result};
