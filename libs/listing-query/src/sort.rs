use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::schema::FieldSchema;
use crate::value::FieldKind;

/// Field sorted on, descending, when the request names no sort: newest first.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub kind: FieldKind,
    pub dir: SortDir,
}

impl SortKey {
    pub fn asc(field: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            field: field.into(),
            kind,
            dir: SortDir::Asc,
        }
    }
}

/// Ordered sort keys; earlier keys take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sort(pub Vec<SortKey>);

impl Sort {
    /// Parse `a,-b,+c`. Absent or blank input falls back to
    /// [`DEFAULT_SORT_FIELD`] descending.
    pub fn parse(raw: Option<&str>, schema: &FieldSchema) -> Result<Self, QueryError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Self::parse_tokens(raw, schema),
            None => Ok(Self::default_for(schema)),
        }
    }

    fn parse_tokens(raw: &str, schema: &FieldSchema) -> Result<Self, QueryError> {
        let mut keys: Vec<SortKey> = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (dir, name) = match token.as_bytes()[0] {
                b'-' => (SortDir::Desc, &token[1..]),
                b'+' => (SortDir::Asc, &token[1..]),
                _ => (SortDir::Asc, token),
            };
            let def = schema
                .resolve(name)
                .filter(|d| d.sortable)
                .ok_or_else(|| QueryError::UnknownSortField(name.to_string()))?;
            if keys.iter().any(|k| k.field == def.name) {
                continue;
            }
            keys.push(SortKey {
                field: def.name.clone(),
                kind: def.kind,
                dir,
            });
        }
        if keys.is_empty() {
            return Ok(Self::default_for(schema));
        }
        Ok(Self(keys))
    }

    /// Empty when the schema has no creation timestamp; callers still add
    /// their tiebreaker.
    fn default_for(schema: &FieldSchema) -> Self {
        match schema.resolve(DEFAULT_SORT_FIELD) {
            Some(def) => Self(vec![SortKey {
                field: def.name.clone(),
                kind: def.kind,
                dir: SortDir::Desc,
            }]),
            None => Self::default(),
        }
    }

    /// Append `key` unless a key on the same field is already present.
    pub fn ensure_tiebreaker(mut self, key: SortKey) -> Self {
        if !self.0.iter().any(|k| k.field == key.field) {
            self.0.push(key);
        }
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// Signed form, e.g. `-rentPrice,+id`.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|k| match k.dir {
                SortDir::Asc => format!("+{}", k.field),
                SortDir::Desc => format!("-{}", k.field),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}
