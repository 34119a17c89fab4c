mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use common::app;
use serde_json::{json, Value};

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["firstName"].as_str().unwrap().to_string())
        .collect()
}

/// Birth date `years` ago today, so the age is exactly `years`.
fn born_years_ago(years: i32) -> String {
    let today = Utc::now().date_naive();
    let day = if today.month() == 2 && today.day() == 29 { 28 } else { today.day() };
    format!("{:04}-{:02}-{:02}", today.year() - years, today.month(), day)
}

#[tokio::test]
async fn only_admins_list_users() {
    let app = app().await;
    let (user, _) = app.register("Ana", "ana@example.com", "1990-01-01").await;
    let (status, body) = app.get("/users/allUsers", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["code"], "forbidden");

    let (admin, _) = app.admin("root@example.com").await;
    let (status, body) = app.get("/users/allUsers", &admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["totalCount"], 2);
}

#[tokio::test]
async fn name_filters_fold_non_ascii_capitals() {
    let app = app().await;
    app.register("Ștefan", "stefan@example.com", "1990-01-01").await;
    app.register("Stefan", "plain@example.com", "1990-01-01").await;
    let (admin, _) = app.admin("root@example.com").await;

    // ș = %C8%99
    let (status, body) = app.get("/users/allUsers?firstName=%C8%99tefan", &admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), vec!["Ștefan"]);
}

#[tokio::test]
async fn age_is_derived_and_filterable() {
    let app = app().await;
    let (admin, _) = app.admin("root@example.com").await;
    app.register("Eighteen", "a@example.com", &born_years_ago(18)).await;
    app.register("Thirty", "b@example.com", &born_years_ago(30)).await;
    app.register("Sixty", "c@example.com", &born_years_ago(60)).await;

    let (status, body) = app.get("/users/allUsers?age=18-30&sort=age", &admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(names(&body), vec!["Eighteen", "Thirty"]);
    assert_eq!(body["data"][0]["age"], 18);
    assert_eq!(body["data"][1]["age"], 30);

    let (_, exact) = app.get("/users/allUsers?age=60", &admin).await;
    assert_eq!(names(&exact), vec!["Sixty"]);
}

#[tokio::test]
async fn published_flats_count_and_its_alias() {
    let app = app().await;
    let (admin, _) = app.admin("root@example.com").await;
    let (ana, _) = app.register("Ana", "ana@example.com", "1990-01-01").await;
    let (bob, _) = app.register("Bob", "bob@example.com", "1990-01-01").await;
    for _ in 0..3 {
        app.create_flat(&ana, json!({})).await;
    }
    app.create_flat(&bob, json!({})).await;

    let (_, body) = app
        .get("/users/allUsers?sort=-publishedFlatsCount", &admin)
        .await;
    assert_eq!(names(&body), vec!["Ana", "Bob", "Admin"]);
    assert_eq!(body["data"][0]["publishedFlatsCount"], 3);
    assert_eq!(body["data"][2]["publishedFlatsCount"], 0);

    let (_, alias) = app.get("/users/allUsers?flatsCount=1-5&sort=flatsCount", &admin).await;
    assert_eq!(names(&alias), vec!["Bob", "Ana"]);

    let (_, none) = app.get("/users/allUsers?flatsCount=0", &admin).await;
    assert_eq!(names(&none), vec!["Admin"]);
}

#[tokio::test]
async fn role_filter_and_paging() {
    let app = app().await;
    let (admin, _) = app.admin("root@example.com").await;
    for i in 0..4 {
        app.register(&format!("U{i}"), &format!("u{i}@example.com"), "1990-01-01")
            .await;
    }

    let (_, admins) = app.get("/users/allUsers?role=admin", &admin).await;
    assert_eq!(names(&admins), vec!["Admin"]);

    let (_, page) = app
        .get("/users/allUsers?role=user&sort=firstName&page=2&limit=3", &admin)
        .await;
    assert_eq!(names(&page), vec!["U3"]);
    assert_eq!(page["totalCount"], 4);
    assert_eq!(page["count"], 1);
    assert_eq!(page["page"], 2);
}

#[tokio::test]
async fn unknown_user_fields_are_rejected() {
    let app = app().await;
    let (admin, _) = app.admin("root@example.com").await;
    for uri in [
        "/users/allUsers?password=x",
        "/users/allUsers?age=old",
        "/users/allUsers?sort=birthDate",
        "/users/allUsers?limit=ten",
    ] {
        let (status, _) = app.get(uri, &admin).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}
