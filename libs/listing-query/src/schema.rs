use std::collections::HashMap;

use crate::value::FieldKind;

/// One public field of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Canonical API name, e.g. `rentPrice`.
    pub name: String,
    pub kind: FieldKind,
    pub filterable: bool,
    pub sortable: bool,
}

/// Whitelist of the fields a listing endpoint accepts in filters and sorts.
///
/// Lookups are case-insensitive. Aliases resolve to the canonical field, so
/// `flatsCount` and `publishedFlatsCount` name the same thing.
#[derive(Clone, Debug, Default)]
pub struct FieldSchema {
    fields: HashMap<String, FieldDef>,
    aliases: HashMap<String, String>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field usable in both filters and sorts.
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(name.into(), kind, true, true)
    }

    /// Field usable only as a sort key (timestamps, ids).
    pub fn sort_only(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(name.into(), kind, false, true)
    }

    pub fn alias(mut self, alias: impl Into<String>, canonical: &str) -> Self {
        self.aliases
            .insert(alias.into().to_lowercase(), canonical.to_lowercase());
        self
    }

    fn insert(mut self, name: String, kind: FieldKind, filterable: bool, sortable: bool) -> Self {
        self.fields.insert(
            name.to_lowercase(),
            FieldDef {
                name,
                kind,
                filterable,
                sortable,
            },
        );
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&FieldDef> {
        let key = name.trim().to_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
