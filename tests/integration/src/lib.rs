//! Integration test utilities for the loyalty bot
//!
//! This crate provides an in-process fake Discord gateway and a helper that
//! runs the real gateway client against it with recording collaborators.

pub mod bot;
pub mod fake_gateway;

pub use bot::*;
pub use fake_gateway::*;
