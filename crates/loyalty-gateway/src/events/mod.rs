//! Gateway events
//!
//! Dispatch events received from Discord.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{MessageCreateEvent, ReadyEvent, ThreadCreateEvent, UserPayload};
