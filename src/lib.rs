//! Client-side behavior for the portfolio page.
//!
//! The behavior core (scheduling, scroll gating, reveals, typing, toasts and
//! the contact submitter) is target independent. DOM adapters and the page
//! boot live in the wasm-only modules.

pub mod config;
pub mod contact;
pub mod effects;
pub mod error;
pub mod notification;
pub mod reveal;
pub mod scheduler;
pub mod scroll_gate;
pub mod typing;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
pub mod frontend;
#[cfg(target_arch = "wasm32")]
mod toast_layer;

#[cfg(test)]
pub(crate) mod testing;
