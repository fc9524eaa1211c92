/*
 * Digest Daemon
 * Joshua Bassett, 2017
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::MalformedRecord;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Action,
    Event,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Kind::Action => f.write_str("action"),
            Kind::Event => f.write_str("event"),
        }
    }
}

impl FromStr for Kind {
    type Err = String;

    // Case insensitive, for interactive input. The wire format is always lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "action" => Ok(Kind::Action),
            "event" => Ok(Kind::Event),
            other => Err(format!("unknown record type {:?}", other)),
        }
    }
}

/**
 * Represents a record submitted by a client.
 */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Date")]
    pub timestamp: String,
    #[serde(rename = "Type")]
    pub kind: Kind,
    pub detail: String,
}

impl Record {
    pub fn new(timestamp: impl Into<String>, kind: Kind, detail: impl Into<String>) -> Self {
        Record { timestamp: timestamp.into(), kind, detail: detail.into() }
    }

    // Stamps a record with the current time in the given offset.
    pub fn now(kind: Kind, detail: impl Into<String>, offset: UtcOffset) -> Result<Self, time::error::Format> {
        let timestamp = OffsetDateTime::now_utc().to_offset(offset).format(TIMESTAMP_FORMAT)?;
        Ok(Record::new(timestamp, kind, detail))
    }

    /// Decodes a single JSON record, rejecting timestamps that are not
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn decode(payload: &str) -> Result<Self, MalformedRecord> {
        let record: Record = serde_json::from_str(payload.trim())?;
        if PrimitiveDateTime::parse(&record.timestamp, TIMESTAMP_FORMAT).is_err() {
            return Err(MalformedRecord::Timestamp(record.timestamp));
        }
        Ok(record)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_field_names() {
        let record = Record::decode(r#"{"Date": "2024-01-01 10:00:00", "Type": "action", "detail": "shipped build"}"#).unwrap();
        assert_eq!(record, Record::new("2024-01-01 10:00:00", Kind::Action, "shipped build"));
    }

    #[test]
    fn encodes_wire_field_names() {
        let record = Record::new("2024-01-01 10:00:05", Kind::Event, "deploy started");
        assert_eq!(
            record.encode().unwrap(),
            r#"{"Date":"2024-01-01 10:00:05","Type":"event","detail":"deploy started"}"#
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Record::decode(r#"{"Date": "2024-01-01 10:00:00", "Type": "alarm", "detail": "x"}"#).unwrap_err();
        assert!(matches!(err, MalformedRecord::Json(_)));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let err = Record::decode(r#"{"Date": "yesterday", "Type": "event", "detail": "x"}"#).unwrap_err();
        assert!(matches!(err, MalformedRecord::Timestamp(ref ts) if ts == "yesterday"));
    }

    #[test]
    fn rejects_non_record_payload() {
        assert!(Record::decode("hello there").is_err());
        assert!(Record::decode("[1, 2, 3]").is_err());
    }

    #[test]
    fn parses_kind_from_user_input() {
        assert_eq!("Action".parse::<Kind>(), Ok(Kind::Action));
        assert_eq!(" EVENT ".parse::<Kind>(), Ok(Kind::Event));
        assert!("incident".parse::<Kind>().is_err());
    }

    #[test]
    fn stamps_with_second_precision() {
        let record = Record::now(Kind::Action, "tagged release", UtcOffset::UTC).unwrap();
        assert_eq!(record.timestamp.len(), "2024-01-01 10:00:00".len());
        assert!(Record::decode(&record.encode().unwrap()).is_ok());
    }
}
