use super::helpers::{
    FakeOrderHistory, admin_token, expect_status, ids, import, read_json, request, send,
    shopper_token, spawn_app, spawn_app_with,
};
use axum::http::StatusCode;
use reviews_api::{
    domain::review::repository::ReviewRepository,
    infrastructure::settings::traits::AppSettings,
};
use serde_json::{Value, json};

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let app = spawn_app();

    let res = send(&app.app, request("DELETE", "/api/v1/admin/reviews", None, None)).await;
    expect_status(res, StatusCode::UNAUTHORIZED).await;

    let res = send(
        &app.app,
        request("DELETE", "/api/v1/admin/reviews", Some(&shopper_token("shopper-1")), None),
    )
    .await;
    expect_status(res, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn bulk_approve_reports_unknown_ids() {
    let app = spawn_app();
    let created = import(&app.app, json!([{ "product_id": "P1", "rating": 4 }])).await;

    let res = send(
        &app.app,
        request(
            "POST",
            "/api/v1/admin/reviews/bulk",
            Some(&admin_token()),
            Some(json!({ "ids": [created[0], 999], "action": "approve" })),
        ),
    )
    .await;
    let outcome: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(outcome["requested"], 2);
    assert_eq!(outcome["processed"], 1);
    assert_eq!(outcome["failed"], 1);
    assert_eq!(outcome["all_succeeded"], false);
    assert_eq!(outcome["failed_items"][0]["id"], 999);

    let res = send(
        &app.app,
        request("GET", &format!("/api/v1/reviews/{}", created[0]), None, None),
    )
    .await;
    let review: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(review["approved"], true);
}

#[tokio::test]
async fn approval_gates_the_rating_when_required() {
    let app = spawn_app_with(
        AppSettings {
            require_approval: true,
            approve_new_reviews: false,
        },
        FakeOrderHistory::default(),
    );
    let created = import(
        &app.app,
        json!([
            { "product_id": "P1", "rating": 2 },
            { "product_id": "P1", "rating": 5 }
        ]),
    )
    .await;

    let res = send(&app.app, request("GET", "/api/v1/products/P1/rating", None, None)).await;
    let summary: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(summary["total_count"], 0);

    let res = send(
        &app.app,
        request(
            "POST",
            "/api/v1/admin/reviews/bulk",
            Some(&admin_token()),
            Some(json!({ "ids": [created[1]], "action": "approve" })),
        ),
    )
    .await;
    expect_status(res, StatusCode::OK).await;

    let res = send(&app.app, request("GET", "/api/v1/products/P1/rating", None, None)).await;
    let summary: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(summary["total_count"], 1);
    assert_eq!(summary["average"].as_f64(), Some(5.0));

    let res = send(
        &app.app,
        request("GET", "/api/v1/reviews?product_id=P1&status=false", None, None),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(ids(&body["data"]), vec![created[0]]);
}

#[tokio::test]
async fn bulk_delete_removes_reviews_and_lookup_entries() {
    let app = spawn_app();
    let created = import(
        &app.app,
        json!([
            { "product_id": "P1", "rating": 4 },
            { "product_id": "P2", "rating": 2 },
            { "product_id": "P2", "rating": 3 }
        ]),
    )
    .await;

    let res = send(
        &app.app,
        request(
            "POST",
            "/api/v1/admin/reviews/bulk",
            Some(&admin_token()),
            Some(json!({ "ids": [created[0], created[1]], "action": "delete" })),
        ),
    )
    .await;
    let outcome: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(outcome["all_succeeded"], true);

    let lookup = app.repository.load_lookup().await.expect("lookup readable");
    assert_eq!(lookup.keys().copied().collect::<Vec<_>>(), vec![created[2]]);
    assert!(app.repository.get_product_reviews("P1").await.expect("readable").is_empty());

    for id in &created[..2] {
        let res = send(&app.app, request("GET", &format!("/api/v1/reviews/{}", id), None, None)).await;
        expect_status(res, StatusCode::NOT_FOUND).await;
    }
}

#[tokio::test]
async fn single_delete_is_not_found_the_second_time() {
    let app = spawn_app();
    let created = import(&app.app, json!([{ "product_id": "P1", "rating": 4 }])).await;
    let uri = format!("/api/v1/admin/reviews/{}", created[0]);

    let res = send(&app.app, request("DELETE", &uri, Some(&admin_token()), None)).await;
    expect_status(res, StatusCode::NO_CONTENT).await;

    let res = send(&app.app, request("DELETE", &uri, Some(&admin_token()), None)).await;
    expect_status(res, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn edit_keeps_identity_and_moves_review_last() {
    let app = spawn_app();
    let created = import(
        &app.app,
        json!([
            { "product_id": "P1", "rating": 2, "review_date_time": "2024-01-05T08:00:00Z" },
            { "product_id": "P1", "rating": 3 }
        ]),
    )
    .await;

    let res = send(
        &app.app,
        request(
            "PATCH",
            &format!("/api/v1/admin/reviews/{}", created[0]),
            Some(&admin_token()),
            Some(json!({ "rating": 5, "title": "Grew on me" })),
        ),
    )
    .await;
    let edited: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(edited["id"], created[0]);
    assert_eq!(edited["cache_id"], created[0]);
    assert_eq!(edited["product_id"], "P1");
    assert_eq!(edited["rating"], 5);
    assert_eq!(edited["review_date_time"], "2024-01-05T08:00:00Z");

    let res = send(&app.app, request("GET", "/api/v1/products/P1/reviews", None, None)).await;
    let reviews: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(ids(&reviews), vec![created[1], created[0]]);

    let res = send(
        &app.app,
        request(
            "PATCH",
            &format!("/api/v1/admin/reviews/{}", created[0]),
            Some(&admin_token()),
            Some(json!({ "product_id": "P2", "rating": 5 })),
        ),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;

    let res = send(
        &app.app,
        request(
            "PATCH",
            "/api/v1/admin/reviews/777",
            Some(&admin_token()),
            Some(json!({ "rating": 5 })),
        ),
    )
    .await;
    expect_status(res, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn bulk_requests_are_bounded_and_validated() {
    let app = spawn_app();

    let too_many: Vec<i64> = (1..=201).collect();
    let res = send(
        &app.app,
        request(
            "POST",
            "/api/v1/admin/reviews/bulk",
            Some(&admin_token()),
            Some(json!({ "ids": too_many, "action": "approve" })),
        ),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;

    let res = send(
        &app.app,
        request(
            "POST",
            "/api/v1/admin/reviews/bulk",
            Some(&admin_token()),
            Some(json!({ "ids": [1], "action": "archive" })),
        ),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn clear_removes_everything_but_ids_keep_increasing() {
    let app = spawn_app();
    import(
        &app.app,
        json!([
            { "product_id": "P1", "rating": 4 },
            { "product_id": "P2", "rating": 2 }
        ]),
    )
    .await;

    let res = send(&app.app, request("DELETE", "/api/v1/admin/reviews", Some(&admin_token()), None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["cleared"], 2);

    let res = send(&app.app, request("GET", "/api/v1/reviews", None, None)).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["range"]["total"], 0);

    let created = import(&app.app, json!([{ "product_id": "P1", "rating": 5 }])).await;
    assert_eq!(created, vec![3]);
}
