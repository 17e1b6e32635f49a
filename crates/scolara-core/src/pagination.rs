//! Pagination parameters for list endpoints.
//!
//! List endpoints accept `limit`, `offset`, and `page` query parameters and
//! return a `{ data, total }` envelope. `limit` is clamped to [1, 100] with
//! a default of 10; when `page` is provided it takes precedence over
//! `offset`.

use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

/// Deserializes an optional string into an optional i64.
///
/// Query parameters may arrive as empty strings, which should be treated
/// as `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Returns the effective offset. If `page` is set, it is calculated
    /// from the page number; otherwise the explicit offset (minimum 0).
    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            (page.max(1) - 1) * self.limit()
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_clamping() {
        let cases = [
            (Some(1), 1),
            (Some(50), 50),
            (Some(100), 100),
            (Some(150), 100),
            (Some(0), 1),
            (Some(-1), 1),
            (None, 10),
        ];
        for (input, expected) in cases {
            let params = PaginationParams {
                limit: input,
                ..Default::default()
            };
            assert_eq!(params.limit(), expected);
        }
    }

    #[test]
    fn test_offset_from_page() {
        let params = PaginationParams {
            limit: Some(25),
            offset: None,
            page: Some(3),
        };
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(99),
            page: Some(2),
        };
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn test_negative_offset_clamped() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(-5),
            page: None,
        };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_deserialize_empty_strings_as_defaults() {
        let json = r#"{"limit":"","offset":""}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_deserialize_string_values() {
        let json = r#"{"limit":"25","offset":"50"}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 50);
    }
}
