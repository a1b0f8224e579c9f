//! Confetti application crate.
//!
//! Hosts the confetti engine in a browser page (wasm32) or a desktop window.

pub mod host;
