use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One entry of the Forward DNS dataset
///
/// Each dataset line is a JSON object such as
/// `{"timestamp":"1492468299","name":"www.example.com","type":"a","value":"93.184.216.34"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Fully-qualified domain name that was queried
    pub name: String,

    /// Lower-cased record type tag ("a", "aaaa", "cname", ...)
    #[serde(default, rename = "type")]
    pub record_type: String,

    /// Resolved target: an IP literal for address records, a domain otherwise
    #[serde(default)]
    pub value: String,

    /// Collection time as published by the dataset (Unix seconds)
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: String,
}

impl Record {
    /// Decode a record from one raw dataset line
    pub fn from_slice(line: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(line)
    }

    /// Collection time, when the timestamp holds Unix seconds
    #[must_use]
    pub fn collected_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Borrow the field selected by `field`
    #[must_use]
    pub fn field(&self, field: ReportField) -> &str {
        match field {
            ReportField::Name => &self.name,
            ReportField::Value => &self.value,
        }
    }

    /// Consume the record, keeping only the field selected by `field`
    #[must_use]
    pub fn into_field(self, field: ReportField) -> String {
        match field {
            ReportField::Name => self.name,
            ReportField::Value => self.value,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Which field of a matching record gets reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportField {
    /// The queried domain name
    #[default]
    Name,
    /// The resolved value
    Value,
}

/// Record types published in the Forward DNS dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Canonical name record
    Cname,
    /// Mail exchange record
    Mx,
    /// Name server record
    Ns,
    /// Pointer record
    Ptr,
    /// Text record
    Txt,
}

impl RecordType {
    /// All known record types
    pub const ALL: [Self; 7] = [
        Self::A,
        Self::Aaaa,
        Self::Cname,
        Self::Mx,
        Self::Ns,
        Self::Ptr,
        Self::Txt,
    ];

    /// The tag used by the dataset for this type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::Aaaa => "aaaa",
            Self::Cname => "cname",
            Self::Mx => "mx",
            Self::Ns => "ns",
            Self::Ptr => "ptr",
            Self::Txt => "txt",
        }
    }
}

/// Error returned when a record type tag is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported record type: {0} (expected one of a, aaaa, cname, mx, ns, ptr, txt)")]
pub struct UnknownRecordType(pub String);

impl FromStr for RecordType {
    type Err = UnknownRecordType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| UnknownRecordType(s.to_string()))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}
