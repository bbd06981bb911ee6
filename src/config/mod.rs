//! Configuration types for the event logger.
//!
//! Provides:
//! - The built-in event to level table
//! - The resolved, immutable [`EventLevelMap`]
//! - A serde-backed [`EventLoggerConfig`] for loading overrides

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};
use crate::logger::LogLevel;
use crate::types::MailerEvent;

/// Prefix prepended to every emitted message.
pub const LOG_PREFIX: &str = "[MAILER] ";

/// Built-in level for each event. `None` disables an event.
pub const DEFAULT_LEVELS: [(MailerEvent, Option<LogLevel>); 10] = [
    (MailerEvent::BeforeSend, Some(LogLevel::Debug)),
    (MailerEvent::SendSuccess, Some(LogLevel::Info)),
    (MailerEvent::SendFailure, Some(LogLevel::Error)),
    (MailerEvent::ExceptionThrown, Some(LogLevel::Error)),
    (MailerEvent::CommandSent, Some(LogLevel::Debug)),
    (MailerEvent::ResponseReceived, Some(LogLevel::Debug)),
    (MailerEvent::BeforeTransportStart, Some(LogLevel::Debug)),
    (MailerEvent::TransportStarted, Some(LogLevel::Debug)),
    (MailerEvent::BeforeTransportStop, Some(LogLevel::Debug)),
    (MailerEvent::TransportStopped, Some(LogLevel::Debug)),
];

/// Resolved level for every mailer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLevelMap {
    levels: [Option<LogLevel>; 10],
}

impl EventLevelMap {
    /// Returns the built-in table.
    pub fn defaults() -> Self {
        let mut levels = [None; 10];
        for (event, level) in DEFAULT_LEVELS {
            levels[slot(event)] = level;
        }
        Self { levels }
    }

    /// Returns the level for an event, or `None` if it is disabled.
    pub fn get(&self, event: MailerEvent) -> Option<LogLevel> {
        self.levels[slot(event)]
    }

    /// Returns true if the event is logged at all.
    pub fn is_enabled(&self, event: MailerEvent) -> bool {
        self.get(event).is_some()
    }

    /// Sets the level for one event.
    pub fn set(&mut self, event: MailerEvent, level: Option<LogLevel>) {
        self.levels[slot(event)] = level;
    }

    /// Overlays string-keyed overrides.
    ///
    /// Keys may be canonical names or legacy keys; unknown keys are ignored.
    pub fn apply_overrides<I, K>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, Option<LogLevel>)>,
        K: AsRef<str>,
    {
        for (key, level) in overrides {
            match MailerEvent::from_name(key.as_ref()) {
                Some(event) => self.set(event, level),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(key = key.as_ref(), "Ignoring level override for unknown event");
                }
            }
        }
    }

    /// Iterates over every event and its resolved level.
    pub fn iter(&self) -> impl Iterator<Item = (MailerEvent, Option<LogLevel>)> + '_ {
        MailerEvent::ALL
            .into_iter()
            .map(move |event| (event, self.get(event)))
    }
}

impl Default for EventLevelMap {
    fn default() -> Self {
        Self::defaults()
    }
}

fn slot(event: MailerEvent) -> usize {
    event as usize
}

/// Parses a level setting; `off`, `none` and `disabled` disable the event.
pub fn parse_level_setting(s: &str) -> ConfigResult<Option<LogLevel>> {
    match s.to_ascii_lowercase().as_str() {
        "off" | "none" | "disabled" => Ok(None),
        other => other.parse().map(Some),
    }
}

/// Serializable event logger configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLoggerConfig {
    /// Level overrides keyed by event name.
    #[serde(default, with = "level_settings")]
    pub levels: BTreeMap<String, Option<LogLevel>>,
}

impl EventLoggerConfig {
    /// Creates an empty configuration (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override.
    pub fn with_level(mut self, event: impl Into<String>, level: Option<LogLevel>) -> Self {
        self.levels.insert(event.into(), level);
        self
    }

    /// Parses a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Resolves overrides over the built-in table.
    pub fn resolve(&self) -> EventLevelMap {
        let mut map = EventLevelMap::defaults();
        map.apply_overrides(self.levels.iter().map(|(k, v)| (k.as_str(), *v)));
        map
    }
}

// Level settings accept a level name, "off", or null.
mod level_settings {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(
        levels: &BTreeMap<String, Option<LogLevel>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let named: BTreeMap<&str, String> = levels
            .iter()
            .map(|(event, level)| {
                let name = match level {
                    Some(level) => level.name().to_ascii_lowercase(),
                    None => "off".to_string(),
                };
                (event.as_str(), name)
            })
            .collect();
        named.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Option<LogLevel>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(event, setting)| {
                let level = match setting {
                    Some(s) => parse_level_setting(&s).map_err(serde::de::Error::custom)?,
                    None => None,
                };
                Ok::<_, D::Error>((event, level))
            })
            .collect()
    }
}
