//! Query-string filter terms → typed predicates.
//!
//! Accepted forms per field kind:
//!
//! | kind | forms |
//! |---|---|
//! | text | substring, case-insensitive |
//! | place | substring, case-insensitive, whitespace and `-` ignored |
//! | keyword, uuid | `a` or `a,b,c` |
//! | number, integer | `n`, `a,b,c` or `min-max` |
//! | bool | `true` / `false` |
//! | date | `YYYY-MM-DD` or `YYYY-MM-DD..YYYY-MM-DD` |
//!
//! A numeric range separator is the first `-` that directly follows a digit
//! or `.`; a leading `-` is a sign. `-5--1` is `[-5, -1]`.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::QueryError;
use crate::schema::{FieldDef, FieldSchema};
use crate::value::{FieldKind, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Eq(Value),
    In(Vec<Value>),
    /// Inclusive on both ends.
    Range { min: Value, max: Value },
    /// Lowercased needle.
    Contains(String),
    /// Needle normalized with [`normalize_place`].
    Place(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    /// Canonical field name.
    pub field: String,
    pub kind: FieldKind,
    pub predicate: Predicate,
}

/// Conjunction of terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    terms: Vec<Term>,
}

impl Filter {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn parse<'a, I>(params: I, schema: &FieldSchema) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for (key, raw) in params {
            let def = schema
                .resolve(key)
                .ok_or_else(|| QueryError::UnknownField(key.to_string()))?;
            if !def.filterable {
                return Err(QueryError::NotFilterable(def.name.clone()));
            }
            if !seen.insert(def.name.clone()) {
                return Err(QueryError::DuplicateField(def.name.clone()));
            }
            if let Some(predicate) = parse_predicate(def, raw)? {
                terms.push(Term {
                    field: def.name.clone(),
                    kind: def.kind,
                    predicate,
                });
            }
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Lowercase and drop whitespace and hyphens, so `Alba Iulia` and `alba-iulia`
/// normalize to the same string.
pub fn normalize_place(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Folded form of a searchable value: what `Contains` and `Place` needles
/// are matched against. Stores that persist these keys must build them with
/// this function so both executors agree.
pub fn search_key(kind: FieldKind, s: &str) -> String {
    match kind {
        FieldKind::Place => normalize_place(s),
        _ => s.to_lowercase(),
    }
}

/// Parse one raw value for `def`. Blank values yield `None` (no filter).
pub fn parse_predicate(def: &FieldDef, raw: &str) -> Result<Option<Predicate>, QueryError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let predicate = match def.kind {
        FieldKind::Text => Predicate::Contains(search_key(FieldKind::Text, raw)),
        FieldKind::Place => {
            let needle = search_key(FieldKind::Place, raw);
            if needle.is_empty() {
                return Ok(None);
            }
            Predicate::Place(needle)
        }
        FieldKind::Keyword => list_or_single(raw, |s| Ok(Value::Text(s.to_string())))?,
        FieldKind::Uuid => list_or_single(raw, |s| {
            Uuid::parse_str(s)
                .map(Value::Uuid)
                .map_err(|_| invalid(def, s))
        })?,
        FieldKind::Number | FieldKind::Integer => {
            if raw.contains(',') {
                list_or_single(raw, |s| parse_number(def, s))?
            } else if let Some((lo, hi)) = split_range(raw) {
                Predicate::Range {
                    min: parse_number(def, lo)?,
                    max: parse_number(def, hi)?,
                }
            } else {
                Predicate::Eq(parse_number(def, raw)?)
            }
        }
        FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => Predicate::Eq(Value::Bool(true)),
            "false" => Predicate::Eq(Value::Bool(false)),
            _ => return Err(invalid(def, raw)),
        },
        FieldKind::Date => match raw.split_once("..") {
            Some((lo, hi)) => Predicate::Range {
                min: parse_date(def, lo)?,
                max: parse_date(def, hi)?,
            },
            None => Predicate::Eq(parse_date(def, raw)?),
        },
        FieldKind::DateTime => return Err(QueryError::NotFilterable(def.name.clone())),
    };
    Ok(Some(predicate))
}

fn list_or_single(
    raw: &str,
    mut parse: impl FnMut(&str) -> Result<Value, QueryError>,
) -> Result<Predicate, QueryError> {
    if !raw.contains(',') {
        return Ok(Predicate::Eq(parse(raw)?));
    }
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(&mut parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Predicate::In(values))
}

/// Split `min-max`, treating a `-` that does not follow a digit or `.` as a sign.
pub fn split_range(raw: &str) -> Option<(&str, &str)> {
    let bytes = raw.as_bytes();
    (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.'))
        .map(|i| (&raw[..i], &raw[i + 1..]))
}

fn parse_number(def: &FieldDef, s: &str) -> Result<Value, QueryError> {
    let s = s.trim();
    match def.kind {
        FieldKind::Integer => s
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid(def, s)),
        _ => match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(invalid(def, s)),
        },
    }
}

fn parse_date(def: &FieldDef, s: &str) -> Result<Value, QueryError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Value::Date)
        .map_err(|_| invalid(def, s))
}

fn invalid(def: &FieldDef, value: &str) -> QueryError {
    QueryError::InvalidValue {
        field: def.name.clone(),
        value: value.to_string(),
        expected: def.kind.as_str(),
    }
}
