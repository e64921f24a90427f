//! Collaborator traits (ports)
//!
//! Define how the bot reaches the outside world; HTTP implementations live in
//! `loyalty-service`.

mod collaborators;

pub use collaborators::{DmApi, MessageApi, PointsApi, PresenceConfigSource, RepoResult};
