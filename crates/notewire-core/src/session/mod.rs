//! Conversation state: message model, event reduction, and the controller.

pub mod consumer;
pub mod controller;
pub mod message;
mod reducer;

pub use consumer::{SessionStatus, StreamConsumer};
pub use controller::{Notice, SessionController, Submission, TurnStream};
pub use message::{Attachment, Message, Part, Role, ThreadId, ToolState};
