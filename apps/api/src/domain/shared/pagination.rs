use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Upper bound on the number of reviews any single read returns.
pub const MAX_RETURNED_RECORDS: usize = 999;

/// Offset/limit window used for per-product listings.
///
/// `offset` is zero-based. A `limit` of zero means "as many as allowed";
/// every limit is clamped to [`MAX_RETURNED_RECORDS`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
pub struct PaginationRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_RETURNED_RECORDS,
        }
    }
}

impl PaginationRequest {
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            0 => MAX_RETURNED_RECORDS,
            limit => limit.min(MAX_RETURNED_RECORDS),
        }
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.effective_limit())
            .collect()
    }
}

/// Inclusive, one-based `from..=to` window used by review search.
///
/// `from` values below one are treated as one. A `to` of zero or less leaves
/// the window open-ended (up to [`MAX_RETURNED_RECORDS`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq)]
#[ts(export)]
pub struct ReviewRange {
    pub from: i64,
    pub to: i64,
}

impl Default for ReviewRange {
    fn default() -> Self {
        Self { from: 1, to: 0 }
    }
}

impl ReviewRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn first_position(&self) -> i64 {
        self.from.max(1)
    }

    pub fn take(&self) -> usize {
        if self.to <= 0 {
            return MAX_RETURNED_RECORDS;
        }
        let span = self.to - self.first_position() + 1;
        usize::try_from(span)
            .unwrap_or(0)
            .min(MAX_RETURNED_RECORDS)
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.first_position() - 1).unwrap_or(0);
        items.into_iter().skip(skip).take(self.take()).collect()
    }
}

/// Applies an inclusive one-based window to an already filtered review set.
pub fn limit_reviews<T>(items: Vec<T>, from: i64, to: i64) -> Vec<T> {
    ReviewRange::new(from, to).apply(items)
}
