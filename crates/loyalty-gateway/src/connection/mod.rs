//! Connection state
//!
//! Lifecycle states, the resumable session and the heartbeat controller.

mod heartbeat;
mod session;
mod state;

pub use heartbeat::{run_heartbeat, Beat, HeartbeatController};
pub use session::SessionManager;
pub use state::ConnectionState;
