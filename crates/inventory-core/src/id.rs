//! Object identifiers
//!
//! Documents are keyed by 12-byte object ids, written as 24 lowercase hex
//! characters. On the wire they use the extended JSON form `{"$oid": "..."}`
//! so the MongoDB backend stores them as native ObjectIds.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing a document identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("Invalid object id length: expected 24 hex characters, got {len}")]
    InvalidLength { len: usize },

    #[error("Invalid object id '{value}': {reason}")]
    InvalidHex { value: String, reason: String },
}

/// A 12-byte document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; 12]);

impl DocumentId {
    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the 24-character hex form
    pub fn parse_str(value: &str) -> Result<Self, IdError> {
        if value.len() != 24 {
            return Err(IdError::InvalidLength { len: value.len() });
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(value, &mut bytes).map_err(|e| IdError::InvalidHex {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(bytes))
    }
}

impl FromStr for DocumentId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$oid", &self.to_hex())?;
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Extended {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Plain(String),
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match IdRepr::deserialize(deserializer)? {
            IdRepr::Extended { oid } => oid,
            IdRepr::Plain(value) => value,
        };
        DocumentId::parse_str(&raw).map_err(de::Error::custom)
    }
}

/// Serde helpers for `{"$date": ...}` timestamps
pub mod extended_date {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::de::{self, Deserializer};
    use serde::ser::{SerializeMap, Serializer};
    use serde::Deserialize;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$date", &value.to_rfc3339_opts(SecondsFormat::Millis, true))?;
        map.end()
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateValue {
        Iso(String),
        Canonical {
            #[serde(rename = "$numberLong")]
            millis: String,
        },
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateRepr {
        Extended {
            #[serde(rename = "$date")]
            date: DateValue,
        },
        Plain(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let iso = match DateRepr::deserialize(deserializer)? {
            DateRepr::Extended { date: DateValue::Iso(iso) } | DateRepr::Plain(iso) => iso,
            DateRepr::Extended { date: DateValue::Canonical { millis } } => {
                let millis: i64 = millis.parse().map_err(de::Error::custom)?;
                return Utc
                    .timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", millis)));
            }
        };

        parse_iso(&iso).map_err(de::Error::custom)
    }

    /// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` stamp taken as UTC
    pub fn parse_iso(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(rfc_err) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|_| rfc_err),
        }
    }
}
