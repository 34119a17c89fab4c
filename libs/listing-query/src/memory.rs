//! In-memory executor for listings whose fields are computed per request
//! (e.g. age from a birth date) and therefore cannot be filtered by the store.

use std::cmp::Ordering;

use crate::filter::{search_key, Predicate, Term};
use crate::page::ListPage;
use crate::sort::{Sort, SortDir};
use crate::value::Value;
use crate::{Filter, ListQuery};

/// Read access to a record's public fields by canonical name.
pub trait Record {
    /// `Value::Null` for fields the record does not carry.
    fn field(&self, name: &str) -> Value;
}

pub fn matches<R: Record>(filter: &Filter, record: &R) -> bool {
    filter
        .terms()
        .iter()
        .all(|term| term_matches(term, &record.field(&term.field)))
}

fn term_matches(term: &Term, actual: &Value) -> bool {
    match &term.predicate {
        Predicate::Eq(v) => actual.loosely_eq(v),
        Predicate::In(vs) => vs.iter().any(|v| actual.loosely_eq(v)),
        Predicate::Range { min, max } => {
            if let (Some(a), Some(lo), Some(hi)) = (actual.as_f64(), min.as_f64(), max.as_f64()) {
                lo <= a && a <= hi
            } else if let (Some(a), Some(lo), Some(hi)) =
                (actual.as_date(), min.as_date(), max.as_date())
            {
                lo <= a && a <= hi
            } else {
                false
            }
        }
        Predicate::Contains(needle) | Predicate::Place(needle) => actual
            .as_text()
            .is_some_and(|s| search_key(term.kind, s).contains(needle.as_str())),
    }
}

pub fn compare<R: Record>(sort: &Sort, a: &R, b: &R) -> Ordering {
    for key in sort.keys() {
        let ord = a.field(&key.field).cmp_for_sort(&b.field(&key.field));
        let ord = match key.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Filter, stable-sort and window `rows`. Ties keep their input order.
pub fn execute<R: Record>(rows: Vec<R>, query: &ListQuery) -> ListPage<R> {
    let mut rows: Vec<R> = rows
        .into_iter()
        .filter(|r| matches(&query.filter, r))
        .collect();
    rows.sort_by(|a, b| compare(&query.sort, a, b));

    let total_count = rows.len() as u64;
    let skip = usize::try_from(query.window.skip()).unwrap_or(usize::MAX);
    let take = usize::try_from(query.window.limit).unwrap_or(usize::MAX);
    let items = rows.into_iter().skip(skip).take(take).collect();

    ListPage::new(query.window, total_count, items)
}
