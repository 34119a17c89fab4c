use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// How a public field is interpreted by filters and comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. Filters are case-insensitive substring matches.
    Text,
    /// Place names. Whitespace and hyphens are ignored when matching.
    Place,
    /// Exact tokens such as roles.
    Keyword,
    Uuid,
    Number,
    Integer,
    Bool,
    /// Calendar day of a UTC timestamp.
    Date,
    DateTime,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Place => "place",
            FieldKind::Keyword => "keyword",
            FieldKind::Uuid => "uuid",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Bool => "boolean",
            FieldKind::Date => "date (YYYY-MM-DD)",
            FieldKind::DateTime => "timestamp",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Integer)
    }
}

/// A typed field value, either parsed from a query string or read from a record.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Integer(i64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Equality with numeric coercion (`3 == 3.0`) and day granularity for dates.
    pub fn loosely_eq(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a == b;
        }
        if let (Value::Date(_), _) | (_, Value::Date(_)) = (self, other) {
            return matches!((self.as_date(), other.as_date()), (Some(a), Some(b)) if a == b);
        }
        self == other
    }

    /// Ordering used by in-memory sorting. `Null` sorts first; values of
    /// unrelated types compare equal so the stable sort keeps their order.
    pub fn cmp_for_sort(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            _ => {
                if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
                    a.total_cmp(&b)
                } else if let (Some(a), Some(b)) = (self.as_date(), other.as_date()) {
                    a.cmp(&b)
                } else {
                    Ordering::Equal
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
