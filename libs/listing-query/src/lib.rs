//! Filter / sort / paginate engine shared by listing endpoints.
//!
//! A [`FieldSchema`] whitelists the public fields of a listing. Query-string
//! pairs are parsed against it into a [`ListQuery`]; storage adapters compile
//! that into their own query language, and [`memory::execute`] runs it over
//! records whose fields are derived at request time.

pub mod error;
pub mod filter;
pub mod memory;
pub mod page;
pub mod schema;
pub mod sort;
pub mod value;

pub use error::QueryError;
pub use filter::{normalize_place, search_key, Filter, Predicate, Term};
pub use memory::Record;
pub use page::{clamp_limit, LimitCfg, ListPage, PageWindow};
pub use schema::{FieldDef, FieldSchema};
pub use sort::{Sort, SortDir, SortKey, DEFAULT_SORT_FIELD};
pub use value::{FieldKind, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Sort,
    pub window: PageWindow,
}

impl ListQuery {
    /// Parse raw `(key, value)` pairs. Non-reserved keys become filter terms;
    /// a repeated reserved key keeps its last value.
    pub fn from_pairs<'a, I>(
        pairs: I,
        schema: &FieldSchema,
        limits: LimitCfg,
    ) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut sort = None;
        let mut page = None;
        let mut limit = None;
        let mut terms = Vec::new();

        for (key, value) in pairs {
            match key.trim() {
                "sort" => sort = Some(value),
                "page" => page = Some(value),
                "limit" => limit = Some(value),
                _ => terms.push((key, value)),
            }
        }

        Ok(Self {
            filter: Filter::parse(terms, schema)?,
            sort: Sort::parse(sort, schema)?,
            window: PageWindow::parse(page, limit, limits)?,
        })
    }

    pub fn with_tiebreaker(mut self, key: SortKey) -> Self {
        self.sort = self.sort.ensure_tiebreaker(key);
        self
    }
}
