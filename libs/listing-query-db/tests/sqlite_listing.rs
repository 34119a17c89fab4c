//! Compiled listing queries against a real in-memory SQLite database.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use listing_query::{search_key, FieldKind, FieldSchema, LimitCfg, ListQuery, SortKey};
use listing_query_db::{fetch_page, FieldMap, ListQueryExt};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Set,
};

mod listing {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "listings")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub title_search: String,
        pub city: String,
        pub city_key: String,
        pub rent_price: f64,
        pub year_built: i32,
        pub has_ac: bool,
        pub date_available: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn schema() -> FieldSchema {
    FieldSchema::new()
        .field("title", FieldKind::Text)
        .field("city", FieldKind::Place)
        .field("rentPrice", FieldKind::Number)
        .field("yearBuilt", FieldKind::Integer)
        .field("hasAc", FieldKind::Bool)
        .field("dateAvailable", FieldKind::Date)
        .sort_only("createdAt", FieldKind::Integer)
        .sort_only("id", FieldKind::Integer)
}

fn fields() -> FieldMap<listing::Entity> {
    use listing::Column;
    FieldMap::new()
        .insert_searchable("title", Column::Title, Column::TitleSearch)
        .insert_searchable("city", Column::City, Column::CityKey)
        .insert("rentPrice", Column::RentPrice)
        .insert("yearBuilt", Column::YearBuilt)
        .insert("hasAc", Column::HasAc)
        .insert("dateAvailable", Column::DateAvailable)
        .insert("createdAt", Column::Id)
        .insert("id", Column::Id)
}

async fn seeded_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(listing::Entity);
    db.execute(backend.build(&stmt)).await?;

    let rows = [
        ("Studio near park", "Cluj-Napoca", 200.0, 1975, false, 1),
        ("Sunny loft", "Alba-Iulia", 350.0, 2010, true, 3),
        ("100% renovated flat", "Bucharest", 600.0, 2020, true, 3),
        ("Penthouse", "Alba Iulia", 700.0, 2022, true, 15),
        ("Family house", "Sibiu", 450.0, 1999, false, 30),
    ];
    for (title, city, rent, year, ac, day) in rows {
        insert(&db, title, city, rent, year, ac, day).await?;
    }
    Ok(db)
}

async fn insert(
    db: &DatabaseConnection,
    title: &str,
    city: &str,
    rent: f64,
    year: i32,
    ac: bool,
    day: u32,
) -> Result<()> {
    listing::ActiveModel {
        title: Set(title.into()),
        title_search: Set(search_key(FieldKind::Text, title)),
        city: Set(city.into()),
        city_key: Set(search_key(FieldKind::Place, city)),
        rent_price: Set(rent),
        year_built: Set(year),
        has_ac: Set(ac),
        date_available: Set(Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

fn query(pairs: &[(&str, &str)]) -> ListQuery {
    ListQuery::from_pairs(pairs.iter().copied(), &schema(), LimitCfg::default())
        .expect("valid query")
        .with_tiebreaker(SortKey::asc("id", FieldKind::Integer))
}

async fn rents(db: &DatabaseConnection, pairs: &[(&str, &str)]) -> Result<(Vec<f64>, u64)> {
    let page = fetch_page(listing::Entity::find(), db, &query(pairs), &fields()).await?;
    Ok((page.items.iter().map(|m| m.rent_price).collect(), page.total_count))
}

#[tokio::test]
async fn range_sort_and_window() -> Result<()> {
    let db = seeded_db().await?;
    let (got, total) = rents(
        &db,
        &[
            ("rentPrice", "300-600"),
            ("sort", "-rentPrice"),
            ("page", "1"),
            ("limit", "2"),
        ],
    )
    .await?;
    assert_eq!(got, vec![600.0, 450.0]);
    assert_eq!(total, 3);
    Ok(())
}

#[tokio::test]
async fn place_match_ignores_spaces_and_hyphens() -> Result<()> {
    let db = seeded_db().await?;
    let (a, total_a) = rents(&db, &[("city", "Alba Iulia"), ("sort", "rentPrice")]).await?;
    let (b, total_b) = rents(&db, &[("city", "alba-iulia"), ("sort", "rentPrice")]).await?;
    assert_eq!(a, vec![350.0, 700.0]);
    assert_eq!(a, b);
    assert_eq!((total_a, total_b), (2, 2));
    Ok(())
}

#[tokio::test]
async fn text_search_is_case_insensitive_and_escaped() -> Result<()> {
    let db = seeded_db().await?;
    let (got, _) = rents(&db, &[("title", "LOFT")]).await?;
    assert_eq!(got, vec![350.0]);

    // `%` is literal, not a wildcard
    let (got, _) = rents(&db, &[("title", "100%")]).await?;
    assert_eq!(got, vec![600.0]);
    let (got, _) = rents(&db, &[("title", "%")]).await?;
    assert_eq!(got, vec![600.0]);
    Ok(())
}

#[tokio::test]
async fn text_and_place_fold_non_ascii_capitals() -> Result<()> {
    let db = seeded_db().await?;
    insert(&db, "Ștefan cel Mare studio", "Brașov", 999.0, 2001, true, 20).await?;
    insert(&db, "Quiet room", "Șimleu Silvaniei", 111.0, 1980, false, 21).await?;

    let (got, _) = rents(&db, &[("title", "ștefan")]).await?;
    assert_eq!(got, vec![999.0]);
    let (got, _) = rents(&db, &[("title", "ȘTEFAN CEL")]).await?;
    assert_eq!(got, vec![999.0]);
    let (got, _) = rents(&db, &[("city", "BRAȘOV")]).await?;
    assert_eq!(got, vec![999.0]);
    let (got, _) = rents(&db, &[("city", "șimleu-silvaniei")]).await?;
    assert_eq!(got, vec![111.0]);
    Ok(())
}

#[tokio::test]
async fn pages_past_the_end_are_empty_but_counted() -> Result<()> {
    let db = seeded_db().await?;
    let (got, total) = rents(&db, &[("limit", "2"), ("page", "9")]).await?;
    assert!(got.is_empty());
    assert_eq!(total, 5);

    let huge = i64::MAX.to_string();
    let (got, total) = rents(&db, &[("limit", "3"), ("page", huge.as_str())]).await?;
    assert!(got.is_empty());
    assert_eq!(total, 5);
    Ok(())
}

#[tokio::test]
async fn membership_bool_and_integer_filters() -> Result<()> {
    let db = seeded_db().await?;
    let (got, _) = rents(&db, &[("yearBuilt", "1975,2022"), ("sort", "rentPrice")]).await?;
    assert_eq!(got, vec![200.0, 700.0]);

    let (got, total) = rents(&db, &[("hasAc", "false"), ("sort", "-rentPrice")]).await?;
    assert_eq!(got, vec![450.0, 200.0]);
    assert_eq!(total, 2);
    Ok(())
}

#[tokio::test]
async fn date_filters_work_by_calendar_day() -> Result<()> {
    let db = seeded_db().await?;
    let (got, _) = rents(&db, &[("dateAvailable", "2024-06-03"), ("sort", "rentPrice")]).await?;
    assert_eq!(got, vec![350.0, 600.0]);

    let (got, _) = rents(
        &db,
        &[("dateAvailable", "2024-06-02..2024-06-15"), ("sort", "rentPrice")],
    )
    .await?;
    assert_eq!(got, vec![350.0, 600.0, 700.0]);
    Ok(())
}

#[tokio::test]
async fn default_order_is_newest_first_and_pages_stitch() -> Result<()> {
    let db = seeded_db().await?;
    let (all, _) = rents(&db, &[]).await?;
    assert_eq!(all, vec![450.0, 700.0, 600.0, 350.0, 200.0]);

    let mut stitched = Vec::new();
    for page in ["1", "2", "3"] {
        let (chunk, total) = rents(&db, &[("limit", "2"), ("page", page)]).await?;
        assert_eq!(total, 5);
        stitched.extend(chunk);
    }
    assert_eq!(stitched, all);
    Ok(())
}

#[tokio::test]
async fn ext_trait_composes_with_plain_selects() -> Result<()> {
    let db = seeded_db().await?;
    let q = query(&[("rentPrice", "0-1000"), ("sort", "-yearBuilt"), ("limit", "1")]);
    let rows = listing::Entity::find()
        .apply_list_query(&q, &fields())?
        .all(&db)
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].year_built, 2022);
    Ok(())
}
