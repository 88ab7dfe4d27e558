//! Field values and the scalar wire codecs.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::element::Element;

/// Wire format for date-time values: UTC, second precision, literal `Z`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Scalar kinds an attribute can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text.
    String,
    /// `true` / `false`.
    Boolean,
    /// Signed decimal integer.
    Integer,
    /// `YYYY-MM-DDTHH:MM:SSZ`.
    DateTime,
}

impl ValueKind {
    /// Parses wire text into a value.
    ///
    /// `Ok(None)` means the text carries no value: empty text for every
    /// kind, and anything but `true`/`false` for booleans. `Err` carries the
    /// reason the text was rejected.
    pub fn clean(self, text: &str) -> Result<Option<Value>, String> {
        if text.is_empty() {
            return Ok(None);
        }
        match self {
            Self::String => Ok(Some(Value::Str(text.to_string()))),
            Self::Boolean => Ok(match text {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            }),
            Self::Integer => text
                .parse::<i64>()
                .map(|n| Some(Value::Int(n)))
                .map_err(|e| e.to_string()),
            Self::DateTime => parse_datetime(text)
                .map(|dt| Some(Value::DateTime(dt)))
                .ok_or_else(|| format!("expected {DATETIME_FORMAT}")),
        }
    }

    /// Returns true if `value` is a scalar of this kind.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::Str(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Integer, Value::Int(_))
                | (Self::DateTime, Value::DateTime(_))
        )
    }
}

/// A value stored under a field name on an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// UTC timestamp.
    DateTime(DateTime<Utc>),
    /// A nested element.
    Element(Box<Element>),
    /// The ordered members of a collection field.
    List(Vec<Element>),
}

impl Value {
    /// Renders a scalar as wire text. Elements and lists have no wire text.
    #[must_use]
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::DateTime(dt) => Some(format_datetime(dt)),
            Self::Element(_) | Self::List(_) => None,
        }
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a timestamp value.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns a nested element.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the members of a collection.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Element> for Value {
    fn from(e: Element) -> Self {
        Self::Element(Box::new(e))
    }
}

impl From<Vec<Element>> for Value {
    fn from(items: Vec<Element>) -> Self {
        Self::List(items)
    }
}

/// Formats a timestamp in the SAML wire format.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parses a timestamp in the SAML wire format.
///
/// Only the exact `YYYY-MM-DDTHH:MM:SSZ` shape is accepted; fractional
/// seconds, offsets and lower-case separators are rejected.
#[must_use]
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let bytes = text.as_bytes();
    let shape_ok = bytes.len() == 20
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            19 => *b == b'Z',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
