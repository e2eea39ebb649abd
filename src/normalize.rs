use crate::labels::LabelLocale;
use crate::models::Series;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const NAIVE_INSTANT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy)]
pub enum RawPayload<'a> {
    Absent,
    Text(&'a str),
    Json(&'a Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPayload {
    StructuredMap(Map<String, Value>),
    TextLines(String),
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// Full instant, assumed UTC when untagged.
    Instant,
    /// Only the part before `T` is meaningful.
    DatePrefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: String,
    pub kind: TimestampKind,
    pub count: u64,
}

impl Record {
    pub fn calendar_day(&self) -> Option<NaiveDate> {
        match self.kind {
            TimestampKind::Instant => parse_utc_day(&self.timestamp),
            TimestampKind::DatePrefix => {
                let date = self.timestamp.split('T').next().unwrap_or_default();
                NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
            }
        }
    }
}

/// Summed counts per UTC calendar day, ordered chronologically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyAggregate(BTreeMap<NaiveDate, u64>);

impl DailyAggregate {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for record in records {
            match record.calendar_day() {
                Some(day) => {
                    let total = days.entry(day).or_default();
                    *total = total.saturating_add(record.count);
                }
                None => debug!(
                    timestamp = %record.timestamp,
                    "skipping record with unparsable timestamp"
                ),
            }
        }
        Self(days)
    }

    pub fn total(&self) -> u64 {
        self.0.values().fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.0.iter().map(|(day, count)| (*day, *count))
    }

    pub fn into_series(self, locale: LabelLocale) -> Series {
        let mut series = Series::default();
        for (day, count) in self.0 {
            series.labels.push(locale.day_label(day));
            series.values.push(count);
        }
        series
    }
}

pub fn normalize(raw: RawPayload<'_>) -> Series {
    normalize_with(raw, LabelLocale::default())
}

pub fn normalize_with(raw: RawPayload<'_>, locale: LabelLocale) -> Series {
    aggregate(raw).into_series(locale)
}

pub fn aggregate(raw: RawPayload<'_>) -> DailyAggregate {
    DailyAggregate::from_records(records(parse_payload(raw)))
}

pub fn parse_payload(raw: RawPayload<'_>) -> ParsedPayload {
    match raw {
        RawPayload::Absent => ParsedPayload::Invalid,
        RawPayload::Text(text) => parse_text(text),
        RawPayload::Json(Value::Object(map)) => ParsedPayload::StructuredMap(map.clone()),
        RawPayload::Json(Value::String(text)) => parse_text(text),
        RawPayload::Json(Value::Null) => ParsedPayload::Invalid,
        RawPayload::Json(other) => {
            warn!(kind = json_kind(other), "timeline payload is not an object");
            ParsedPayload::Invalid
        }
    }
}

fn parse_text(text: &str) -> ParsedPayload {
    if text.trim().is_empty() {
        return ParsedPayload::Invalid;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => ParsedPayload::StructuredMap(map),
        Ok(other) => {
            debug!(
                kind = json_kind(&other),
                "timeline text is JSON but not an object, reading as lines"
            );
            ParsedPayload::TextLines(text.to_string())
        }
        Err(_) => ParsedPayload::TextLines(text.to_string()),
    }
}

pub fn records(parsed: ParsedPayload) -> Vec<Record> {
    match parsed {
        ParsedPayload::StructuredMap(map) => map
            .into_iter()
            .map(|(timestamp, value)| Record {
                timestamp,
                kind: TimestampKind::Instant,
                count: coerce_count(&value),
            })
            .collect(),
        ParsedPayload::TextLines(text) => text.lines().filter_map(parse_line).collect(),
        ParsedPayload::Invalid => Vec::new(),
    }
}

fn parse_line(line: &str) -> Option<Record> {
    // `2025-06-01T00:09: 4`: the count follows the last colon.
    let (timestamp, count) = line.rsplit_once(':')?;
    let timestamp = timestamp.trim();
    let count = count.trim();
    if timestamp.is_empty() || count.is_empty() {
        return None;
    }
    Some(Record {
        timestamp: timestamp.to_string(),
        kind: TimestampKind::DatePrefix,
        count: leading_integer(count),
    })
}

fn parse_utc_day(timestamp: &str) -> Option<NaiveDate> {
    let tagged = if timestamp.ends_with('Z') {
        timestamp.to_string()
    } else {
        format!("{timestamp}Z")
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(&tagged) {
        return Some(instant.with_timezone(&Utc).date_naive());
    }

    let untagged = &tagged[..tagged.len() - 1];
    NAIVE_INSTANT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(untagged, format).ok())
        .map(|instant| instant.date())
        .or_else(|| NaiveDate::parse_from_str(untagged, "%Y-%m-%d").ok())
}

/// Integer coercion for counts; anything unusable becomes zero.
pub fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                count
            } else if let Some(float) = number.as_f64() {
                if float.is_finite() && float > 0.0 {
                    float.trunc() as u64
                } else {
                    0
                }
            } else {
                0
            }
        }
        Value::String(text) => leading_integer(text),
        _ => 0,
    }
}

fn leading_integer(text: &str) -> u64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    digits[..end]
        .bytes()
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
