//! Gateway client
//!
//! Connection loop, reconnect handling and client settings.

mod action;
mod config;
mod error;
mod gateway;

pub use action::{LoopAction, ReconnectReason};
pub use config::{GatewayConfig, DEFAULT_HELLO_TIMEOUT};
pub use error::{GatewayError, GatewayResult};
pub use gateway::GatewayClient;
