mod common;

use axum::http::StatusCode;
use common::{app, prices};
use serde_json::json;

async fn seeded() -> (common::TestApp, String) {
    let app = app().await;
    let (token, _) = app.register("Ana", "ana@example.com", "1990-04-02").await;
    for (price, city, area) in [
        (250.0, "Cluj-Napoca", 30.0),
        (450.0, "Alba Iulia", 55.0),
        (600.0, "Alba-Iulia", 80.0),
        (300.0, "Brasov", 42.0),
        (700.0, "Sibiu", 120.0),
    ] {
        app.create_flat(&token, json!({ "rentPrice": price, "city": city, "areaSize": area }))
            .await;
    }
    (app, token)
}

#[tokio::test]
async fn price_range_sorted_descending_first_page() {
    let (app, token) = seeded().await;
    let (status, body) = app
        .get("/flats?rentPrice=300-600&sort=-rentPrice&page=1&limit=2", &token)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");
    assert_eq!(prices(&body), vec![600.0, 450.0]);
    assert_eq!(body["totalCount"], 3);
    assert_eq!(body["count"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);

    let (_, second) = app
        .get("/flats?rentPrice=300-600&sort=-rentPrice&page=2&limit=2", &token)
        .await;
    assert_eq!(prices(&second), vec![300.0]);
}

#[tokio::test]
async fn city_ignores_spaces_hyphens_and_case() {
    let (app, token) = seeded().await;
    let (_, spaced) = app.get("/flats?city=Alba%20Iulia&sort=rentPrice", &token).await;
    let (_, hyphen) = app.get("/flats?city=alba-iulia&sort=rentPrice", &token).await;
    assert_eq!(prices(&spaced), vec![450.0, 600.0]);
    assert_eq!(prices(&spaced), prices(&hyphen));
}

#[tokio::test]
async fn text_filters_fold_non_ascii_capitals() {
    let (app, token) = seeded().await;
    app.create_flat(
        &token,
        json!({ "title": "Ștefan cel Mare studio", "city": "Brașov", "rentPrice": 999 }),
    )
    .await;

    // ș = %C8%99, Ș = %C8%98
    let (status, body) = app.get("/flats?title=%C8%99tefan", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(prices(&body), vec![999.0]);

    let (_, body) = app.get("/flats?city=BRA%C8%98OV", &token).await;
    assert_eq!(prices(&body), vec![999.0]);

    // the ASCII spelling is a different city
    let (_, body) = app.get("/flats?city=brasov", &token).await;
    assert_eq!(prices(&body), vec![300.0]);

    // search keys follow edits
    let (_, mine) = app.get("/flats?title=studio", &token).await;
    let id = mine["data"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .send(
            axum::http::Method::PATCH,
            &format!("/flats/{id}"),
            Some(&token),
            Some(json!({ "title": "Casa Ănei" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    // ă = %C4%83
    let (_, body) = app.get("/flats?title=%C4%83nei", &token).await;
    assert_eq!(prices(&body), vec![999.0]);
    let (_, body) = app.get("/flats?title=%C8%99tefan", &token).await;
    assert!(prices(&body).is_empty());
}

#[tokio::test]
async fn owner_is_inlined() {
    let (app, token) = seeded().await;
    let (_, body) = app.get("/flats?limit=1", &token).await;
    let owner = &body["data"][0]["owner"];
    assert_eq!(owner["firstName"], "Ana");
    assert_eq!(owner["email"], "ana@example.com");
    assert!(owner.get("password").is_none());
}

#[tokio::test]
async fn default_sort_is_newest_first() {
    let (app, token) = seeded().await;
    let (_, body) = app.get("/flats", &token).await;
    assert_eq!(prices(&body), vec![700.0, 300.0, 600.0, 450.0, 250.0]);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn multiple_filters_are_combined() {
    let (app, token) = seeded().await;
    let (_, body) = app
        .get("/flats?areaSize=40-100&rentPrice=400-800&sort=areaSize", &token)
        .await;
    assert_eq!(prices(&body), vec![450.0, 600.0]);

    let (_, listed) = app.get("/flats?rentPrice=250,700&sort=rentPrice", &token).await;
    assert_eq!(prices(&listed), vec![250.0, 700.0]);
}

#[tokio::test]
async fn inverted_range_matches_nothing() {
    let (app, token) = seeded().await;
    let (status, body) = app.get("/flats?rentPrice=600-300", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_full_total() {
    let (app, token) = seeded().await;
    let (_, body) = app.get("/flats?page=9&limit=2", &token).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn equal_sort_keys_never_repeat_across_pages() {
    let app = app().await;
    let (token, _) = app.register("Ana", "ana@example.com", "1990-04-02").await;
    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(app.create_flat(&token, json!({ "rentPrice": 400.0 })).await);
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (_, body) = app
            .get(&format!("/flats?sort=rentPrice&limit=2&page={page}"), &token)
            .await;
        for f in body["data"].as_array().unwrap() {
            seen.push(f["id"].as_str().unwrap().to_string());
        }
    }
    // ties fall back to insertion order
    assert_eq!(seen, created);
}

#[tokio::test]
async fn boolean_date_and_owner_filters() {
    let app = app().await;
    let (ana, ana_id) = app.register("Ana", "ana@example.com", "1990-04-02").await;
    let (bob, _) = app.register("Bob", "bob@example.com", "1985-07-19").await;
    app.create_flat(&ana, json!({ "hasAc": true, "dateAvailable": "2025-03-01", "rentPrice": 1.0 }))
        .await;
    app.create_flat(&bob, json!({ "hasAc": false, "dateAvailable": "2025-03-15", "rentPrice": 2.0 }))
        .await;

    let (_, ac) = app.get("/flats?hasAc=true", &ana).await;
    assert_eq!(prices(&ac), vec![1.0]);

    let (_, day) = app.get("/flats?dateAvailable=2025-03-15", &ana).await;
    assert_eq!(prices(&day), vec![2.0]);

    let (_, span) = app
        .get("/flats?dateAvailable=2025-03-01..2025-03-31&sort=rentPrice", &ana)
        .await;
    assert_eq!(prices(&span), vec![1.0, 2.0]);

    let (_, mine) = app.get(&format!("/flats?ownerId={ana_id}"), &bob).await;
    assert_eq!(prices(&mine), vec![1.0]);
}

#[tokio::test]
async fn bad_queries_are_rejected() {
    let (app, token) = seeded().await;
    for uri in [
        "/flats?price=100",
        "/flats?rentPrice=cheap",
        "/flats?rentPrice=100&rentPrice=200",
        "/flats?createdAt=2024-01-01",
        "/flats?sort=-password",
        "/flats?page=two",
        "/flats?hasAc=maybe",
    ] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        assert_eq!(body["status"], "failed");
        assert_eq!(body["code"], "bad_request");
    }
}

#[tokio::test]
async fn empty_filter_values_are_ignored() {
    let (app, token) = seeded().await;
    let (status, body) = app.get("/flats?city=&rentPrice=", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 5);
}

#[tokio::test]
async fn listing_requires_a_token() {
    let (app, _) = seeded().await;
    let (status, body) = app
        .send(axum::http::Method::GET, "/flats", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}
