//! Value objects - immutable types that represent domain concepts

mod intents;
mod snowflake;

pub use intents::GatewayIntents;
pub use snowflake::{Snowflake, SnowflakeParseError};
