//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::LedgerError;

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Cuts one page out of `items`.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(params.per_page);
        let start = (params.page - 1) as usize * params.per_page as usize;
        let data = items
            .into_iter()
            .skip(start)
            .take(params.per_page as usize)
            .collect();
        (
            data,
            PaginationMeta {
                page: params.page,
                per_page: params.per_page,
                total,
                total_pages,
            },
        )
    }
}

/// Converts a JSON number into a whole point amount.
///
/// Sign is checked by the service; this only rejects fractions and
/// non-finite values.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for fractional, non-finite or
/// out-of-range numbers.
pub fn whole_points(amount: f64) -> Result<i64, LedgerError> {
    if !amount.is_finite() || amount.fract() != 0.0 || amount.abs() > 9.0e15 {
        return Err(LedgerError::InvalidAmount(format!(
            "points must be a whole number, got {amount}"
        )));
    }
    #[allow(clippy::cast_possible_truncation)]
    let points = amount as i64;
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_second_page() {
        let params = PaginationParams {
            page: 2,
            per_page: 2,
        };
        let (page, meta) = params.paginate((1..=5).collect::<Vec<_>>());
        assert_eq!(page, vec![3, 4]);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn paginate_clamps_zero_values() {
        let params = PaginationParams {
            page: 0,
            per_page: 0,
        };
        let (page, meta) = params.paginate(vec!['a', 'b']);
        assert_eq!(page, vec!['a']);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 1);
    }

    #[test]
    fn whole_points_rejects_fractions() {
        assert!(matches!(whole_points(100.0), Ok(100)));
        assert!(matches!(whole_points(-3.0), Ok(-3)));
        assert!(whole_points(10.5).is_err());
        assert!(whole_points(f64::INFINITY).is_err());
    }
}
