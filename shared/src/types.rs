//! Common types used across the ledger

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a patch field where absent, `null` and a value all differ.
///
/// Use with `#[serde(default, deserialize_with = "...")]`: a missing key stays
/// `None`, `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 500;

    /// SQL LIMIT/OFFSET pair, page is 1-based and per_page is clamped
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE) as i64;
        let page = self.page.max(1) as i64;
        (per_page, (page - 1) * per_page)
    }
}

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset() {
        assert_eq!(Pagination::default().limit_offset(), (50, 0));
        let p = Pagination { page: 3, per_page: 20 };
        assert_eq!(p.limit_offset(), (20, 40));
        let clamped = Pagination { page: 0, per_page: 10_000 };
        assert_eq!(clamped.limit_offset(), (500, 0));
    }
}
