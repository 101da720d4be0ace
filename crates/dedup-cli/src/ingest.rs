//! CSV ingestion: turns an exported record table into candidate records.
//!
//! The first two columns, `id` and `created_at`, are required. Every other
//! column becomes a field; its kind is inferred per column from the
//! non-empty values (number, boolean, date, else text). Empty cells are
//! omitted from the record, which the engine treats as blank.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use dedup_model::{CandidateRecord, FieldKind, FieldValue};

pub fn load_records(path: &Path) -> Result<Vec<CandidateRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers = reader.headers().context("read csv headers")?.clone();

    let id_column = find_column(&headers, "id")
        .ok_or_else(|| anyhow!("missing required column 'id'"))?;
    let created_column = find_column(&headers, "created_at")
        .ok_or_else(|| anyhow!("missing required column 'created_at'"))?;

    let field_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != id_column && *index != created_column)
        .map(|(index, name)| (index, name.to_string()))
        .collect();

    let mut rows = Vec::new();
    for (number, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read csv row {}", number + 2))?;
        rows.push(record);
    }

    // Column kinds are inferred from every non-empty value in the column.
    let kinds: Vec<FieldKind> = field_columns
        .iter()
        .map(|(index, _)| {
            infer_kind(rows.iter().filter_map(|row| {
                row.get(*index).filter(|value| !value.is_empty())
            }))
        })
        .collect();
    for ((_, name), kind) in field_columns.iter().zip(&kinds) {
        debug!(column = %name, kind = %kind, "inferred column kind");
    }

    let mut records = Vec::with_capacity(rows.len());
    for (number, row) in rows.iter().enumerate() {
        let line = number + 2;
        let id = row
            .get(id_column)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("row {line}: empty id"))?;
        let created_raw = row
            .get(created_column)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("row {line}: empty created_at"))?;
        let created_at = parse_created_at(created_raw)
            .with_context(|| format!("row {line}: created_at '{created_raw}'"))?;

        let mut record = CandidateRecord::new(id, created_at);
        for ((index, name), kind) in field_columns.iter().zip(&kinds) {
            let Some(raw) = row.get(*index).filter(|value| !value.is_empty()) else {
                continue;
            };
            let value = parse_value(*kind, raw)
                .with_context(|| format!("row {line}: column '{name}'"))?;
            record.fields.insert(name.clone(), value);
        }
        records.push(record);
    }

    if records.is_empty() {
        bail!("{} contains no records", path.display());
    }
    Ok(records)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare dates (midnight UTC).
fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date '{raw}'"))?;
        return Ok(midnight.and_utc());
    }
    bail!("unrecognized timestamp '{raw}'")
}

/// The narrowest kind every non-empty value in the column fits.
fn infer_kind<'a>(values: impl Iterator<Item = &'a str>) -> FieldKind {
    let mut saw_any = false;
    let mut all_numbers = true;
    let mut all_booleans = true;
    let mut all_dates = true;
    for value in values {
        saw_any = true;
        all_numbers = all_numbers && value.parse::<f64>().is_ok();
        all_booleans = all_booleans && parse_boolean(value).is_some();
        all_dates =
            all_dates && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    }
    if !saw_any {
        return FieldKind::Text;
    }
    if all_booleans {
        FieldKind::Boolean
    } else if all_numbers {
        FieldKind::Number
    } else if all_dates {
        FieldKind::Date
    } else {
        FieldKind::Text
    }
}

fn parse_boolean(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_value(kind: FieldKind, raw: &str) -> Result<FieldValue> {
    let value = match kind {
        FieldKind::Text => FieldValue::Text(raw.to_string()),
        FieldKind::Number => FieldValue::Number(
            raw.parse::<f64>()
                .map_err(|error| anyhow!("bad number '{raw}': {error}"))?,
        ),
        FieldKind::Boolean => FieldValue::Boolean(
            parse_boolean(raw).ok_or_else(|| anyhow!("bad boolean '{raw}'"))?,
        ),
        FieldKind::Date => FieldValue::Date(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|error| anyhow!("bad date '{raw}': {error}"))?,
        ),
    };
    Ok(value)
}
