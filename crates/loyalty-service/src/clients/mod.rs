//! HTTP implementations of the collaborator traits

mod config_source;
mod discord_rest;
mod points;

pub use config_source::HttpConfigSource;
pub use discord_rest::DiscordRestClient;
pub use points::HttpPointsClient;

use loyalty_core::DomainError;

/// Map a reqwest failure onto the domain error taxonomy
pub(crate) fn transport_error(err: reqwest::Error) -> DomainError {
    DomainError::Transport(err.to_string())
}
