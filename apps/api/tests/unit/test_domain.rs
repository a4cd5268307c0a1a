use reviews_api::domain::{
    review::{
        entity::Review,
        errors::DomainError,
        query::{OrderBy, SortDirection, SortField, filter_reviews, parse_review_date_time},
        rating::average_rating,
    },
    shared::pagination::{MAX_RETURNED_RECORDS, PaginationRequest, limit_reviews},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

fn review(id: i64, rating: i32) -> Review {
    Review {
        id,
        cache_id: id,
        product_id: "P1".to_string(),
        rating,
        ..Default::default()
    }
}

#[test]
fn sort_fields_accept_snake_and_pascal_case() {
    assert_eq!(SortField::from_name("review_date_time"), Some(SortField::ReviewDateTime));
    assert_eq!(SortField::from_name("ReviewDateTime"), Some(SortField::ReviewDateTime));
    assert_eq!(SortField::from_name("VERIFIED_PURCHASER"), Some(SortField::VerifiedPurchaser));
    assert_eq!(SortField::from_name("helpfulness"), None);
}

#[test]
fn order_by_defaults_to_descending() {
    let order = OrderBy::parse("rating").expect("rating is sortable");
    assert_eq!(order.direction, SortDirection::Descending);
    let order = OrderBy::parse("rating:ASC").expect("rating is sortable");
    assert_eq!(order.direction, SortDirection::Ascending);
}

#[test]
fn rating_ascending_sort() {
    let sorted = filter_reviews(vec![review(1, 5), review(2, 1), review(3, 3)], "", "rating:asc", "")
        .expect("valid filter");
    let ratings: Vec<i32> = sorted.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![1, 3, 5]);
}

#[test]
fn unknown_sort_field_is_a_validation_error() {
    let err = filter_reviews(vec![review(1, 5)], "", "likes", "").unwrap_err();
    assert!(matches!(err, DomainError::ValidationError(_)));
}

#[test]
fn malformed_dates_sort_as_the_minimum_timestamp() {
    assert_eq!(parse_review_date_time("not a date"), DateTime::<Utc>::MIN_UTC);

    let mut dated = review(1, 4);
    dated.review_date_time = "2024-03-01T10:00:00Z".to_string();
    let mut garbled = review(2, 4);
    garbled.review_date_time = "yesterday-ish".to_string();

    let newest_first = filter_reviews(vec![garbled.clone(), dated.clone()], "", "review_date_time", "")
        .expect("valid filter");
    assert_eq!(newest_first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

    let oldest_first =
        filter_reviews(vec![dated, garbled], "", "review_date_time:asc", "").expect("valid filter");
    assert_eq!(oldest_first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn filter_then_limit_is_idempotent_from_the_first_position() {
    let reviews: Vec<Review> = (1..=8)
        .map(|id| {
            let mut r = review(id, (id % 5 + 1) as i32);
            r.approved = id % 2 == 0;
            r.reviewer_name = Some(format!("Reviewer {}", id));
            r
        })
        .collect();

    let once = limit_reviews(
        filter_reviews(reviews, "reviewer", "rating:asc", "true").expect("valid filter"),
        1,
        3,
    );
    let twice = limit_reviews(
        filter_reviews(once.clone(), "reviewer", "rating:asc", "true").expect("valid filter"),
        1,
        3,
    );
    assert_eq!(once, twice);
    assert!(once.iter().all(|r| r.approved));
}

#[test]
fn average_rating_rounds_half_away_from_zero() {
    assert_eq!(average_rating(&Vec::<Review>::new()), Decimal::ZERO);
    assert_eq!(
        average_rating(&[review(1, 3), review(2, 5)]),
        Decimal::from_str("4.00").unwrap()
    );
    // 13 / 3 = 4.333..
    assert_eq!(
        average_rating(&[review(1, 4), review(2, 4), review(3, 5)]),
        Decimal::from_str("4.33").unwrap()
    );
    // 14 / 3 = 4.666..
    assert_eq!(
        average_rating(&[review(1, 4), review(2, 5), review(3, 5)]),
        Decimal::from_str("4.67").unwrap()
    );
}

#[test]
fn pagination_defaults_are_safe_and_stable() {
    let p = PaginationRequest::default();
    assert_eq!(p.limit, MAX_RETURNED_RECORDS);
    assert_eq!(p.offset, 0);
    assert_eq!(limit_reviews((1..=5).collect::<Vec<_>>(), 2, 4), vec![2, 3, 4]);
}
