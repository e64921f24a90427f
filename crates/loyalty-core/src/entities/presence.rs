//! Presence configuration
//!
//! Externally supplied bot presence (status text, rotation, activity type).
//! The gateway only reads it; the config poller replaces it wholesale after
//! merging each fetched document.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Activity type shown next to the bot's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ActivityType {
    /// "Playing {name}"
    #[default]
    Playing = 0,
    /// "Streaming {name}"
    Streaming = 1,
    /// "Listening to {name}"
    Listening = 2,
    /// "Watching {name}"
    Watching = 3,
    /// Custom status text
    Custom = 4,
    /// "Competing in {name}"
    Competing = 5,
}

impl ActivityType {
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Playing),
            1 => Some(Self::Streaming),
            2 => Some(Self::Listening),
            3 => Some(Self::Watching),
            4 => Some(Self::Custom),
            5 => Some(Self::Competing),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid activity type: {value}")))
    }
}

/// Online status published in presence updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    Invisible,
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Idle => write!(f, "idle"),
            Self::Dnd => write!(f, "dnd"),
            Self::Invisible => write!(f, "invisible"),
        }
    }
}

/// Presence configuration document
///
/// Field names match the JSON served by the external config source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceConfig {
    /// Master switch: when off the bot appears invisible with no activity
    #[serde(default = "default_power")]
    pub power: bool,

    /// Static status text used when rotation is off
    #[serde(default, rename = "status")]
    pub status_text: String,

    /// Whether to cycle through `rotation`
    #[serde(default)]
    pub rotate: bool,

    /// Status texts to rotate through
    #[serde(default)]
    pub rotation: Vec<String>,

    /// Seconds between rotation steps
    #[serde(default = "default_rotation_interval")]
    pub rotation_interval: u64,

    /// Activity type for every status text
    #[serde(default)]
    pub activity_type: ActivityType,
}

fn default_power() -> bool {
    true
}

fn default_rotation_interval() -> u64 {
    60
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            power: default_power(),
            status_text: "Collecting loyalty points".to_string(),
            rotate: false,
            rotation: Vec::new(),
            rotation_interval: default_rotation_interval(),
            activity_type: ActivityType::default(),
        }
    }
}

impl PresenceConfig {
    /// Status to publish
    #[must_use]
    pub fn status(&self) -> PresenceStatus {
        if self.power {
            PresenceStatus::Online
        } else {
            PresenceStatus::Invisible
        }
    }

    /// Whether the rotation loop should advance the status text
    #[must_use]
    pub fn rotation_enabled(&self) -> bool {
        self.power && self.rotate && !self.rotation.is_empty()
    }

    /// Activity name for the given rotation step
    ///
    /// Returns `None` when powered off or when there is nothing to show.
    #[must_use]
    pub fn activity_at(&self, step: usize) -> Option<&str> {
        if !self.power {
            return None;
        }
        let name = if self.rotation_enabled() {
            self.rotation[step % self.rotation.len()].as_str()
        } else {
            self.status_text.as_str()
        };
        (!name.is_empty()).then_some(name)
    }

    /// Shallow-merge a fetched JSON document over this config
    ///
    /// Top-level keys present in `patch` replace the current values; absent
    /// keys are kept. The merged result is validated before being returned.
    pub fn merged_with(&self, patch: &Value) -> Result<Self, DomainError> {
        let Value::Object(patch) = patch else {
            return Err(DomainError::InvalidPresenceConfig(
                "expected a JSON object".to_string(),
            ));
        };

        let mut current = serde_json::to_value(self)
            .map_err(|e| DomainError::InvalidPresenceConfig(e.to_string()))?;
        if let Value::Object(fields) = &mut current {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
        }

        let merged: Self = serde_json::from_value(current)
            .map_err(|e| DomainError::InvalidPresenceConfig(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }

    /// Check invariants the rotation loop relies on
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rotation_interval == 0 {
            return Err(DomainError::InvalidPresenceConfig(
                "rotationInterval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}
