//! Gateway intents bitflags
//!
//! Declares which event categories the bot receives over the gateway.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Discord gateway intents
    ///
    /// Sent as a plain integer in the Identify payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GatewayIntents: u64 {
        /// Guild, channel and thread lifecycle events (includes THREAD_CREATE)
        const GUILDS                   = 1 << 0;
        /// Member add/update/remove
        const GUILD_MEMBERS            = 1 << 1;
        /// MESSAGE_CREATE/UPDATE/DELETE in guild channels
        const GUILD_MESSAGES           = 1 << 9;
        /// Reaction events in guild channels
        const GUILD_MESSAGE_REACTIONS  = 1 << 10;
        /// Direct message events
        const DIRECT_MESSAGES          = 1 << 12;
        /// Access to message content (privileged)
        const MESSAGE_CONTENT          = 1 << 15;

        /// Intents requested by the loyalty bot
        const LOYALTY_BOT = Self::GUILDS.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::MESSAGE_CONTENT.bits();
    }
}

impl Default for GatewayIntents {
    fn default() -> Self {
        Self::LOYALTY_BOT
    }
}

impl Serialize for GatewayIntents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for GatewayIntents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
