//! Search, sort and status filtering over in-memory review sets.
//!
//! Filtering always runs in the same order: search term, then sort, then
//! approval status.

use super::entity::Review;
use super::errors::DomainError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

const DIRECTION_DELIMITER: char = ':';

/// Formats tried, in order, after RFC 3339 and RFC 2822.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

type Comparator = fn(&Review, &Review) -> Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    CacheId,
    ProductId,
    Sku,
    ShopperId,
    ReviewerName,
    Title,
    Text,
    Rating,
    VerifiedPurchaser,
    Approved,
    ReviewDateTime,
}

impl SortField {
    pub const ALL: [SortField; 12] = [
        SortField::Id,
        SortField::CacheId,
        SortField::ProductId,
        SortField::Sku,
        SortField::ShopperId,
        SortField::ReviewerName,
        SortField::Title,
        SortField::Text,
        SortField::Rating,
        SortField::VerifiedPurchaser,
        SortField::Approved,
        SortField::ReviewDateTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::CacheId => "cache_id",
            SortField::ProductId => "product_id",
            SortField::Sku => "sku",
            SortField::ShopperId => "shopper_id",
            SortField::ReviewerName => "reviewer_name",
            SortField::Title => "title",
            SortField::Text => "text",
            SortField::Rating => "rating",
            SortField::VerifiedPurchaser => "verified_purchaser",
            SortField::Approved => "approved",
            SortField::ReviewDateTime => "review_date_time",
        }
    }

    /// Resolves `rating`, `Rating`, `review_date_time` and `ReviewDateTime` alike.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_field_name(name);
        Self::ALL
            .into_iter()
            .find(|field| normalize_field_name(field.name()) == wanted)
    }

    fn comparator(self) -> Comparator {
        match self {
            SortField::Id => |a, b| a.id.cmp(&b.id),
            SortField::CacheId => |a, b| a.cache_id.cmp(&b.cache_id),
            SortField::ProductId => |a, b| a.product_id.cmp(&b.product_id),
            SortField::Sku => |a, b| a.sku.cmp(&b.sku),
            SortField::ShopperId => |a, b| a.shopper_id.cmp(&b.shopper_id),
            SortField::ReviewerName => |a, b| a.reviewer_name.cmp(&b.reviewer_name),
            SortField::Title => |a, b| a.title.cmp(&b.title),
            SortField::Text => |a, b| a.text.cmp(&b.text),
            SortField::Rating => |a, b| a.rating.cmp(&b.rating),
            SortField::VerifiedPurchaser => |a, b| a.verified_purchaser.cmp(&b.verified_purchaser),
            SortField::Approved => |a, b| a.approved.cmp(&b.approved),
            SortField::ReviewDateTime => |a, b| {
                parse_review_date_time(&a.review_date_time)
                    .cmp(&parse_review_date_time(&b.review_date_time))
            },
        }
    }
}

fn normalize_field_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Parsed `<field>[:asc|:desc]` expression. Direction defaults to descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: SortField,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let mut parts = value.trim().split(DIRECTION_DELIMITER);
        let field_name = parts.next().unwrap_or_default().trim();
        let field = SortField::from_name(field_name).ok_or_else(|| {
            DomainError::ValidationError(format!("unknown sort field '{}'", field_name))
        })?;
        let direction = match parts.next() {
            Some(suffix) if suffix.to_lowercase().contains("asc") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        };
        Ok(Self { field, direction })
    }

    /// Stable sort; ties keep their incoming order in both directions.
    pub fn sort(&self, reviews: &mut [Review]) {
        let compare = self.field.comparator();
        match self.direction {
            SortDirection::Ascending => reviews.sort_by(compare),
            SortDirection::Descending => reviews.sort_by(|a, b| compare(b, a)),
        }
    }
}

/// Lenient timestamp parsing for the free-form `review_date_time` field.
///
/// Never fails: text that matches no known format maps to the minimum
/// representable timestamp.
pub fn parse_review_date_time(value: &str) -> DateTime<Utc> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return parsed.with_timezone(&Utc);
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return parsed.and_utc();
        }
    }
    for format in DATE_FORMATS {
        if let Some(parsed) = NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return parsed.and_utc();
        }
    }
    DateTime::<Utc>::MIN_UTC
}

/// Parses an approval status filter (`true` / `false`, any case).
pub fn parse_status(value: &str) -> Result<bool, DomainError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DomainError::ValidationError(format!(
            "status must be 'true' or 'false', got '{}'",
            value
        ))),
    }
}

/// A validated search/sort/status filter, ready to apply to any review set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub search_term: Option<String>,
    pub order_by: Option<OrderBy>,
    pub approved: Option<bool>,
}

impl ReviewFilter {
    /// Blank inputs are treated as absent.
    pub fn parse(
        search_term: Option<&str>,
        order_by: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            search_term: non_blank(search_term).map(str::to_lowercase),
            order_by: non_blank(order_by).map(OrderBy::parse).transpose()?,
            approved: non_blank(status).map(parse_status).transpose()?,
        })
    }

    pub fn apply(&self, reviews: Vec<Review>) -> Vec<Review> {
        let mut reviews: Vec<Review> = match &self.search_term {
            Some(needle) => reviews
                .into_iter()
                .filter(|review| review.matches_search(needle))
                .collect(),
            None => reviews,
        };

        if let Some(order_by) = &self.order_by {
            order_by.sort(&mut reviews);
        }

        if let Some(approved) = self.approved {
            reviews.retain(|review| review.approved == approved);
        }

        reviews
    }
}

/// Applies search term, sort order and status filter in that order.
pub fn filter_reviews(
    reviews: Vec<Review>,
    search_term: &str,
    order_by: &str,
    status: &str,
) -> Result<Vec<Review>, DomainError> {
    let filter = ReviewFilter::parse(Some(search_term), Some(order_by), Some(status))?;
    Ok(filter.apply(reviews))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
