//! [`ListQuery`] → SeaORM compiler (parsed query in, SQL out).
//! Parsing belongs to the REST layer; this crate only consumes `listing_query` types.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use listing_query::{
    FieldKind, Filter, ListPage, ListQuery, Predicate, Sort, SortDir, Term, Value,
};
use sea_orm::{
    sea_query::{Expr, LikeExpr, Order, SimpleExpr},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SelectorTrait,
};
use thiserror::Error;

/// Canonical API field name → entity column.
///
/// Text and place fields also name a *search column* holding
/// `listing_query::search_key` of the value; their filters run against it
/// so case folding happens in Rust rather than in the database.
#[derive(Clone)]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, MappedField<E::Column>>,
}

#[derive(Clone, Copy)]
struct MappedField<C> {
    column: C,
    search: Option<C>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column) -> Self {
        self.map.insert(
            api_name.into().to_lowercase(),
            MappedField {
                column: col,
                search: None,
            },
        );
        self
    }

    /// `col` for sorting and equality, `search_col` for substring filters.
    pub fn insert_searchable(
        mut self,
        api_name: impl Into<String>,
        col: E::Column,
        search_col: E::Column,
    ) -> Self {
        self.map.insert(
            api_name.into().to_lowercase(),
            MappedField {
                column: col,
                search: Some(search_col),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<E::Column> {
        self.map.get(&name.to_lowercase()).map(|f| f.column)
    }

    pub fn search_column(&self, name: &str) -> Option<E::Column> {
        self.map.get(&name.to_lowercase()).and_then(|f| f.search)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryBuildError {
    #[error("field has no column mapping: {0}")]
    UnknownField(String),

    #[error("field has no search column: {0}")]
    NotSearchable(String),

    #[error("type mismatch on {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },
}

pub type QueryBuildResult<T> = Result<T, QueryBuildError>;

#[derive(Debug, Error)]
pub enum QueryDbError {
    #[error(transparent)]
    Build(#[from] QueryBuildError),

    #[error("query failed: {0}")]
    Db(#[from] DbErr),
}

/* ---------- coercion ---------- */

fn mismatch(term: &Term, got: &Value) -> QueryBuildError {
    QueryBuildError::TypeMismatch {
        field: term.field.clone(),
        expected: term.kind.as_str(),
        got: got.type_name(),
    }
}

fn coerce(term: &Term, v: &Value) -> QueryBuildResult<sea_orm::Value> {
    Ok(match (term.kind, v) {
        (FieldKind::Integer, Value::Integer(i)) => (*i).into(),
        (FieldKind::Number, v) => match v.as_f64() {
            Some(n) => n.into(),
            None => return Err(mismatch(term, v)),
        },
        (FieldKind::Text | FieldKind::Place | FieldKind::Keyword, Value::Text(s)) => {
            s.clone().into()
        }
        (FieldKind::Uuid, Value::Uuid(u)) => (*u).into(),
        (FieldKind::Bool, Value::Bool(b)) => (*b).into(),
        (FieldKind::DateTime, Value::DateTime(dt)) => (*dt).into(),
        (_, other) => return Err(mismatch(term, other)),
    })
}

fn day_start(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(NaiveTime::MIN).and_utc()
}

/// `[from 00:00, to + 1 day 00:00)` on a timestamp column.
fn day_span<C: ColumnTrait>(col: C, from: NaiveDate, to: NaiveDate) -> SimpleExpr {
    let lower = col.gte(day_start(from));
    match to.succ_opt() {
        Some(next) => lower.and(col.lt(day_start(next))),
        None => lower,
    }
}

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", like_escape(s))).escape('\\')
}

/* ---------- Filter → Condition ---------- */

pub fn term_to_condition<E: EntityTrait>(
    term: &Term,
    fmap: &FieldMap<E>,
) -> QueryBuildResult<Condition> {
    if let Predicate::Contains(needle) | Predicate::Place(needle) = &term.predicate {
        let col = fmap
            .search_column(&term.field)
            .ok_or_else(|| QueryBuildError::NotSearchable(term.field.clone()))?;
        return Ok(Condition::all().add(col.like(like_contains(needle))));
    }

    let col = fmap
        .get(&term.field)
        .ok_or_else(|| QueryBuildError::UnknownField(term.field.clone()))?;
    let date = |v: &Value| v.as_date().ok_or_else(|| mismatch(term, v));

    let expr = match (&term.predicate, term.kind) {
        (Predicate::Eq(v), FieldKind::Date) => day_span(col, date(v)?, date(v)?),
        (Predicate::Range { min, max }, FieldKind::Date) => {
            day_span(col, date(min)?, date(max)?)
        }
        (Predicate::In(vs), FieldKind::Date) => {
            let mut any = Condition::any();
            for v in vs {
                any = any.add(day_span(col, date(v)?, date(v)?));
            }
            return Ok(Condition::all().add(any));
        }
        (Predicate::Eq(v), _) => col.eq(coerce(term, v)?),
        (Predicate::In(vs), _) => {
            if vs.is_empty() {
                // IN () → always false
                Expr::cust("1=0")
            } else {
                let vals = vs
                    .iter()
                    .map(|v| coerce(term, v))
                    .collect::<QueryBuildResult<Vec<_>>>()?;
                col.is_in(vals)
            }
        }
        (Predicate::Range { min, max }, _) => {
            col.between(coerce(term, min)?, coerce(term, max)?)
        }
        // handled above
        (Predicate::Contains(_) | Predicate::Place(_), _) => {
            return Err(QueryBuildError::NotSearchable(term.field.clone()));
        }
    };
    Ok(Condition::all().add(expr))
}

pub fn filter_to_condition<E: EntityTrait>(
    filter: &Filter,
    fmap: &FieldMap<E>,
) -> QueryBuildResult<Condition> {
    let mut cond = Condition::all();
    for term in filter.terms() {
        cond = cond.add(term_to_condition(term, fmap)?);
    }
    Ok(cond)
}

/* ---------- statement extension ---------- */

/// Applies a parsed listing query to any SeaORM select, including joined
/// `SelectTwo` statements. Columns are emitted table-qualified.
pub trait ListQueryExt<E: EntityTrait>: QueryFilter + QueryOrder + QuerySelect + Sized {
    fn apply_filter(self, filter: &Filter, fmap: &FieldMap<E>) -> QueryBuildResult<Self> {
        if filter.is_empty() {
            return Ok(self);
        }
        Ok(self.filter(filter_to_condition(filter, fmap)?))
    }

    fn apply_sort(self, sort: &Sort, fmap: &FieldMap<E>) -> QueryBuildResult<Self> {
        let mut query = self;
        for key in sort.keys() {
            let col = fmap
                .get(&key.field)
                .ok_or_else(|| QueryBuildError::UnknownField(key.field.clone()))?;
            let order = match key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            query = query.order_by(col, order);
        }
        Ok(query)
    }

    /// filter → order → offset/limit
    fn apply_list_query(self, q: &ListQuery, fmap: &FieldMap<E>) -> QueryBuildResult<Self> {
        Ok(self
            .apply_filter(&q.filter, fmap)?
            .apply_sort(&q.sort, fmap)?
            .offset(q.window.skip())
            .limit(q.window.limit))
    }
}

impl<E, S> ListQueryExt<E> for S
where
    E: EntityTrait,
    S: QueryFilter + QueryOrder + QuerySelect,
{
}

/// Page + total count for any select SeaORM can paginate, including joined
/// `SelectTwo` statements. Both statements are issued concurrently and are
/// not read in one transaction.
pub async fn fetch_page<'db, E, S, C>(
    select: S,
    conn: &'db C,
    q: &ListQuery,
    fmap: &FieldMap<E>,
) -> Result<ListPage<<S::Selector as SelectorTrait>::Item>, QueryDbError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    S: ListQueryExt<E> + PaginatorTrait<'db, C>,
{
    let paginator = select
        .apply_filter(&q.filter, fmap)?
        .apply_sort(&q.sort, fmap)?
        .paginate(conn, q.window.limit);

    // pages beyond u64 offsets are empty
    let index = q.window.page.saturating_sub(1);
    let (items, total) = if index.checked_mul(q.window.limit).is_some() {
        tokio::try_join!(paginator.fetch_page(index), paginator.num_items())?
    } else {
        (Vec::new(), paginator.num_items().await?)
    };

    tracing::debug!(
        sort = %q.sort.to_signed_tokens(),
        total,
        returned = items.len(),
        "listing page fetched"
    );
    Ok(ListPage::new(q.window, total, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(like_escape("100%_off\\"), "100\\%\\_off\\\\");
    }

    mod item {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "items")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    #[test]
    fn substring_filters_need_a_search_column() {
        let term = Term {
            field: "name".into(),
            kind: FieldKind::Text,
            predicate: Predicate::Contains("x".into()),
        };
        let plain = FieldMap::<item::Entity>::new().insert("name", item::Column::Name);
        assert_eq!(
            term_to_condition(&term, &plain).unwrap_err(),
            QueryBuildError::NotSearchable("name".into())
        );

        let searchable = FieldMap::<item::Entity>::new().insert_searchable(
            "name",
            item::Column::Name,
            item::Column::Name,
        );
        assert!(term_to_condition(&term, &searchable).is_ok());
    }
}
