use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::Error as DeError;

use super::TransportError;
use crate::domain::RequestOutcome;

/// Decimal-as-text value returned by panels as either JSON string or JSON number.
///
/// For numbers, the raw JSON token is preserved to avoid formatting drift
/// (`10.00` remains `"10.00"` instead of becoming `"10.0"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportNumber(String);

impl TransportNumber {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<serde_json::value::RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => {
                let parsed = serde_json::from_str::<String>(token).map_err(D::Error::custom)?;
                Ok(Self(parsed))
            }
            Some(b'-' | b'0'..=b'9') => Ok(Self(token.to_owned())),
            _ => Err(D::Error::custom(
                "expected numeric field to be JSON string or number",
            )),
        }
    }
}

/// Integer id sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransportId {
    Int(u64),
    String(String),
}

impl TransportId {
    pub fn into_u64(self) -> Result<u64, TransportError> {
        match self {
            Self::Int(value) => Ok(value),
            Self::String(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| TransportError::InvalidId { value }),
        }
    }
}

/// Capability flag sent as a boolean, `0`/`1`, or a string such as `"true"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransportFlag {
    Bool(bool),
    Int(i64),
    String(String),
}

impl TransportFlag {
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            Self::Int(value) => Some(value != 0),
            Self::String(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" | "" => Some(false),
                _ => None,
            },
        }
    }
}

/// Refill/cancel result: an integer code (number or string) or a map of diagnostics.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransportOutcome {
    Code(TransportId),
    Diagnostics(BTreeMap<String, serde_json::Value>),
}

impl TransportOutcome {
    pub fn into_outcome(self) -> Result<RequestOutcome, TransportError> {
        match self {
            Self::Code(id) => Ok(RequestOutcome::Accepted(id.into_u64()?)),
            Self::Diagnostics(map) => Ok(RequestOutcome::Rejected(
                map.into_iter()
                    .map(|(key, value)| {
                        let text = match value {
                            serde_json::Value::String(text) => text,
                            other => other.to_string(),
                        };
                        (key, text)
                    })
                    .collect(),
            )),
        }
    }
}
