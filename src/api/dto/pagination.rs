//! Query parameters for the paginated user listing.
//!
//! Parsing is lenient: values that are missing, unparseable or out of range
//! fall back to the defaults instead of failing the request.

use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Raw `?page=&page_size=` values as sent by the client.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, 1-based. Defaults to 1.
    #[param(value_type = Option<i64>, minimum = 1, example = 1)]
    pub page: Option<String>,

    /// Items per page between 1 and 50. Defaults to 10.
    #[param(value_type = Option<i64>, minimum = 1, maximum = 50, example = 10)]
    pub page_size: Option<String>,
}

impl PaginationParams {
    pub fn normalize(&self) -> PageRequest {
        let page = parse(self.page.as_deref())
            .filter(|page| *page >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let page_size = parse(self.page_size.as_deref())
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        PageRequest { page, page_size }
    }
}

fn parse(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Rows to skip; saturates for absurdly large pages.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// `ceil(total / page_size)`, zero for an empty table.
    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.page_size - 1) / self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PaginationParams {
        PaginationParams {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_when_missing() {
        assert_eq!(params(None, None).normalize(), PageRequest::default());
    }

    #[test]
    fn test_invalid_values_reset() {
        assert_eq!(params(Some("0"), Some("51")).normalize(), PageRequest::default());
        assert_eq!(params(Some("-3"), Some("0")).normalize(), PageRequest::default());
        assert_eq!(params(Some("abc"), Some("ten")).normalize(), PageRequest::default());
    }

    #[test]
    fn test_valid_values_kept() {
        let request = params(Some("3"), Some("50")).normalize();
        assert_eq!(request, PageRequest { page: 3, page_size: 50 });
        assert_eq!(request.offset(), 100);
        assert_eq!(request.limit(), 50);
    }

    #[test]
    fn test_total_pages() {
        let request = PageRequest { page: 1, page_size: 10 };
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let request = params(Some(&i64::MAX.to_string()), Some("50")).normalize();
        assert_eq!(request.offset(), i64::MAX);
    }

    proptest! {
        #[test]
        fn prop_page_size_always_in_range(raw in any::<i64>()) {
            let request = params(None, Some(&raw.to_string())).normalize();
            prop_assert!((1..=MAX_PAGE_SIZE).contains(&request.page_size));
            if (1..=MAX_PAGE_SIZE).contains(&raw) {
                prop_assert_eq!(request.page_size, raw);
            } else {
                prop_assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
            }
        }

        #[test]
        fn prop_last_page_holds_remainder(total in 1i64..10_000, page_size in 1i64..=50) {
            let request = PageRequest { page: 1, page_size };
            let pages = request.total_pages(total);
            let last = total - (pages - 1) * page_size;
            prop_assert!(last >= 1 && last <= page_size);
        }
    }
}
