//! Room configuration.
//!
//! # Responsibility
//! - Carry the per-room knobs the wall service needs.
//! - Validate them before anything touches storage.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::wall::allocator::DEFAULT_MAX_SLOTS;
use crate::wall::expiration::DEFAULT_RETENTION_DAYS;
use crate::wall::scheduler::DEFAULT_RECONCILE_INTERVAL_SECS;

/// Configuration for one wall room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WallConfig {
    /// Storage key holding this room's note collection.
    pub storage_key: String,
    /// Prefix baked into every slot identifier.
    pub slot_prefix: String,
    /// Room language tag, recorded on notes and history entries.
    pub lang: String,
    /// Default author country when a note carries none.
    pub country: String,
    pub max_slots: u32,
    pub reconcile_interval_secs: u64,
    pub retention_days: i64,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            storage_key: "voicewall_notes".to_string(),
            slot_prefix: "grafiter".to_string(),
            lang: "es".to_string(),
            country: "ES".to_string(),
            max_slots: DEFAULT_MAX_SLOTS,
            reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Configuration rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStorageKey,
    EmptySlotPrefix,
    ZeroMaxSlots,
    ZeroInterval,
    NonPositiveRetention(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStorageKey => write!(f, "storage_key cannot be empty"),
            Self::EmptySlotPrefix => write!(f, "slot_prefix cannot be empty"),
            Self::ZeroMaxSlots => write!(f, "max_slots must be at least 1"),
            Self::ZeroInterval => write!(f, "reconcile_interval_secs must be at least 1"),
            Self::NonPositiveRetention(days) => {
                write!(f, "retention_days must be positive, got {days}")
            }
        }
    }
}

impl Error for ConfigError {}

impl WallConfig {
    /// Configuration for one language room, remaining knobs at defaults.
    pub fn for_room(
        storage_key: impl Into<String>,
        slot_prefix: impl Into<String>,
        lang: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            storage_key: storage_key.into(),
            slot_prefix: slot_prefix.into(),
            lang: lang.into(),
            country: country.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if self.slot_prefix.trim().is_empty() {
            return Err(ConfigError::EmptySlotPrefix);
        }
        if self.max_slots == 0 {
            return Err(ConfigError::ZeroMaxSlots);
        }
        if self.reconcile_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.retention_days <= 0 {
            return Err(ConfigError::NonPositiveRetention(self.retention_days));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WallConfig};

    #[test]
    fn default_config_is_valid() {
        assert!(WallConfig::default().validate().is_ok());
    }

    #[test]
    fn blank_storage_key_is_rejected() {
        let config = WallConfig {
            storage_key: "  ".to_string(),
            ..WallConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyStorageKey));
    }

    #[test]
    fn config_deserializes_with_defaults_for_missing_fields() {
        let config: WallConfig =
            serde_json::from_str(r#"{"storageKey":"sala_es","slotPrefix":"grafiter","lang":"es"}"#)
                .unwrap();
        assert_eq!(config.storage_key, "sala_es");
        assert_eq!(config.max_slots, 20);
        assert_eq!(config.reconcile_interval_secs, 60);
        assert_eq!(config.retention_days, 28);
    }
}
