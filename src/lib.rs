//! Grammar checker - correction proxy and progressive-reveal client
//!
//! The proxy relays text to a chat-completion provider with a fixed
//! grammar-correction prompt; the client reveals the corrected text one
//! character at a time.

pub mod client;
pub mod config;
pub mod locale;
pub mod provider;
pub mod server;
pub mod theme;
