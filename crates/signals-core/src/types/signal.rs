//! Trading signal events.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A discrete trading signal as produced by the upstream monitor.
///
/// Only `type`, `symbol` and `timestamp` are interpreted; every other field
/// is carried through untouched. A parsed signal serializes back to the text
/// it was read from: the timestamp keeps its original offset and precision,
/// and an explicit `"symbol": null` stays in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Signal type, e.g. `NEW_BUY` or `STOP_LOSS`
    pub signal_type: String,
    /// Token symbol, absent for account-level events
    pub symbol: Option<String>,
    /// When the signal was produced
    pub timestamp: DateTime<Utc>,
    /// Remaining opaque fields
    pub fields: Map<String, Value>,
    timestamp_text: Option<String>,
    symbol_null: bool,
}

/// Wire shape of a signal.
#[derive(Deserialize)]
struct SignalRecord {
    #[serde(rename = "type")]
    signal_type: String,
    #[serde(default, deserialize_with = "present")]
    symbol: Option<Option<String>>,
    timestamp: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Serialize)]
struct SignalRecordRef<'a> {
    #[serde(rename = "type")]
    signal_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<Option<&'a str>>,
    timestamp: &'a str,
    #[serde(flatten)]
    fields: &'a Map<String, Value>,
}

/// Distinguishes a `null` field from a missing one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TryFrom<SignalRecord> for Signal {
    type Error = String;

    fn try_from(record: SignalRecord) -> Result<Self, Self::Error> {
        let parsed: DateTime<FixedOffset> = record
            .timestamp
            .parse()
            .map_err(|e| format!("invalid timestamp {:?}: {}", record.timestamp, e))?;

        Ok(Self {
            signal_type: record.signal_type,
            symbol_null: matches!(record.symbol, Some(None)),
            symbol: record.symbol.flatten(),
            timestamp: parsed.with_timezone(&Utc),
            fields: record.fields,
            timestamp_text: Some(record.timestamp),
        })
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = SignalRecord::deserialize(deserializer)?;
        Signal::try_from(record).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let timestamp = self.timestamp_text();
        let symbol = match (&self.symbol, self.symbol_null) {
            (Some(symbol), _) => Some(Some(symbol.as_str())),
            (None, true) => Some(None),
            (None, false) => None,
        };

        SignalRecordRef {
            signal_type: &self.signal_type,
            symbol,
            timestamp: &timestamp,
            fields: &self.fields,
        }
        .serialize(serializer)
    }
}

impl Signal {
    /// Create a new signal with no extra fields.
    pub fn new(
        signal_type: impl Into<String>,
        symbol: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            signal_type: signal_type.into(),
            symbol: symbol.map(str::to_string),
            timestamp,
            fields: Map::new(),
            timestamp_text: None,
            symbol_null: false,
        }
    }

    /// Timestamp as it is written out: the original text while it still
    /// names the same instant, otherwise RFC 3339 in UTC.
    pub fn timestamp_text(&self) -> Cow<'_, str> {
        match &self.timestamp_text {
            Some(text)
                if text
                    .parse::<DateTime<FixedOffset>>()
                    .is_ok_and(|t| t == self.timestamp) =>
            {
                Cow::Borrowed(text)
            }
            _ => Cow::Owned(self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    /// Attach an opaque field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Case-insensitive symbol match. Signals without a symbol never match.
    pub fn matches_symbol(&self, symbol: &str) -> bool {
        self.symbol
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
    }

    /// Short `TYPE SYMBOL` label for log lines.
    pub fn label(&self) -> String {
        match &self.symbol {
            Some(symbol) => format!("{} {}", self.signal_type, symbol),
            None => self.signal_type.clone(),
        }
    }
}
