//! Streaming session controller for the notewire answering service.
//!
//! This crate turns a user submission into an authenticated streaming
//! request, consumes the incremental event stream, and reduces it into an
//! ordered message/part model. Presentation layers (chat UI, suggestion
//! chips, sign-in chrome) live elsewhere and only read what this crate
//! exposes: the message list, the session status, and the notice queue.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod transport;
