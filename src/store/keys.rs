//! Record names, storage areas and key encoding
//!
//! Partition structure:
//! - `local`: record:{name} -> JSON value (history, parsing state, tutorial progress)
//! - `synced`: record:{name} -> JSON value (options)

use serde_json::{Value, json};

/// Storage area a record lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreArea {
    Local,
    Synced,
}

impl StoreArea {
    pub fn partition_name(&self) -> &'static str {
        match self {
            StoreArea::Local => "local",
            StoreArea::Synced => "synced",
        }
    }
}

/// The fixed set of persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Options,
    History,
    ParsingStatus,
    LastParsingTimestamp,
    /// When the current holder of the parsing status took it
    ParsingLeaseTimestamp,
    FinishedTutorialIds,
    LastExtensionVersion,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        StoreKey::Options,
        StoreKey::History,
        StoreKey::ParsingStatus,
        StoreKey::LastParsingTimestamp,
        StoreKey::ParsingLeaseTimestamp,
        StoreKey::FinishedTutorialIds,
        StoreKey::LastExtensionVersion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StoreKey::Options => "options",
            StoreKey::History => "history",
            StoreKey::ParsingStatus => "parsingStatus",
            StoreKey::LastParsingTimestamp => "lastParsingTimestamp",
            StoreKey::ParsingLeaseTimestamp => "parsingLeaseTimestamp",
            StoreKey::FinishedTutorialIds => "finishedTutorialIDs",
            StoreKey::LastExtensionVersion => "lastExtensionVersion",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Options follow the user across installs; everything else is device-local.
    pub fn area(&self) -> StoreArea {
        match self {
            StoreKey::Options => StoreArea::Synced,
            _ => StoreArea::Local,
        }
    }

    /// Value materialized on first read
    pub fn default_value(&self) -> Value {
        match self {
            StoreKey::Options => json!({
                "language": "default",
                "historyRetentionPeriodHours": 168.0,
                "insertButtonIntoVideoPage": true,
            }),
            StoreKey::History => json!([]),
            StoreKey::ParsingStatus => json!("parsable"),
            StoreKey::LastParsingTimestamp => json!(0),
            StoreKey::ParsingLeaseTimestamp => json!(0),
            StoreKey::FinishedTutorialIds => json!([]),
            StoreKey::LastExtensionVersion => json!(""),
        }
    }
}

/// Encode a record key: record:{name}
pub fn encode_record_key(key: StoreKey) -> Vec<u8> {
    format!("record:{}", key.name()).into_bytes()
}

/// Decode a record key: record:{name} -> StoreKey
pub fn decode_record_key(key: &[u8]) -> Option<StoreKey> {
    let key_str = std::str::from_utf8(key).ok()?;
    key_str.strip_prefix("record:").and_then(StoreKey::from_name)
}
