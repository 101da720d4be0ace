//! Candidate records and their typed field values.
//!
//! Records are opaque key-value containers owned by the external repository.
//! The engine treats them as read-only input; field maps use `BTreeMap` so
//! every iteration order is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable unique identifier of a candidate record.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Runtime type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed field value on a candidate record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    /// True when the value carries no information.
    ///
    /// Empty or whitespace-only text is blank; numbers, booleans, and dates
    /// are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the value for matching fallbacks and audit notes.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Text(text) => text.trim().to_string(),
            FieldValue::Number(number) => format_number(*number),
            FieldValue::Boolean(flag) => flag.to_string(),
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Equality used by merge resolution: trim-aware for text, exact for
    /// the other kinds. Case differences are significant.
    pub fn merge_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.trim() == b.trim(),
            (a, b) => a == b,
        }
    }
}

/// Formats a number without a trailing `.0` for whole values.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// A record under deduplication.
///
/// Owned by the external repository; the engine only reads it and refers to
/// it by id when producing merge plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(id),
            created_at,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion, mostly for tests and fixtures.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the field value only when present and non-blank.
    pub fn non_blank_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).filter(|value| !value.is_blank())
    }

    /// Counts non-blank values among the given field names.
    ///
    /// Used by the `MostComplete` master-selection strategy.
    pub fn completeness<'a, I>(&self, field_names: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        field_names
            .into_iter()
            .filter(|name| self.non_blank_field(name).is_some())
            .count()
    }
}
