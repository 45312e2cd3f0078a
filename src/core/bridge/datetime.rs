//! Date and time bridges
//!
//! Values are stored as text in the formats SQLite's own date functions
//! produce, so `datetime('now')` and friends compare correctly against them.
//! `DateTime<Utc>` additionally decodes integer unix timestamps.

use super::{ColumnSource, Decode, Encode, ParamSink};
use crate::core::error::Result;
use crate::core::value::StorageClass;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATETIME_FORMAT_T: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn stored_text(source: &dyn ColumnSource) -> Option<String> {
    match source.storage_class() {
        StorageClass::Text => Some(source.text().into_owned()),
        _ => None,
    }
}

impl Encode for DateTime<Utc> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_text(&self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Decode for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn decode(source: &dyn ColumnSource) -> Option<Self> {
        match source.storage_class() {
            StorageClass::Integer => DateTime::from_timestamp(source.int64(), 0),
            StorageClass::Text => {
                let text = source.text();
                DateTime::parse_from_rfc3339(&text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
                            .ok()
                            .map(|naive| naive.and_utc())
                    })
            }
            _ => None,
        }
    }
}

impl Encode for NaiveDateTime {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_text(&self.format(DATETIME_FORMAT).to_string())
    }
}

impl Decode for NaiveDateTime {
    type Output = NaiveDateTime;

    fn decode(source: &dyn ColumnSource) -> Option<Self> {
        let text = stored_text(source)?;
        NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT_T))
            .ok()
    }
}

impl Encode for NaiveDate {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_text(&self.format(DATE_FORMAT).to_string())
    }
}

impl Decode for NaiveDate {
    type Output = NaiveDate;

    fn decode(source: &dyn ColumnSource) -> Option<Self> {
        let text = stored_text(source)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT).ok()
    }
}
