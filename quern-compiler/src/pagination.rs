//! LIMIT/OFFSET helper.
//!
//! Pagination fragments bind their limit and offset as parameters, numbered
//! from a caller-provided start index so they compose with an already
//! compiled WHERE fragment.
//!
//! # Examples
//!
//! ```rust
//! use quern_compiler::pagination::{build_pagination, PageRequest, PaginationOptions};
//!
//! let page = build_pagination(
//!     &PageRequest::Page { page: 3, page_size: 25 },
//!     &PaginationOptions::default(),
//! );
//! assert_eq!(page.sql, "LIMIT $1 OFFSET $2");
//! assert_eq!(page.next_param_index, 3);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::param_key;
use crate::dialect::PlaceholderStyle;
use crate::value::Value;

/// A pagination request, in either page or offset form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRequest {
    /// 1-indexed page number and page size.
    #[serde(rename_all = "camelCase")]
    Page {
        /// The page number (clamped to 1).
        page: u64,
        /// Records per page.
        page_size: u64,
    },
    /// Raw offset and limit.
    Offset {
        /// Records to skip.
        offset: u64,
        /// Maximum records to return.
        limit: u64,
    },
}

/// Options for [`build_pagination`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Upper bound on the effective page size.
    pub max_page_size: u64,
    /// Index of the first parameter this fragment registers.
    pub start_index: usize,
    /// Placeholder style for the emitted fragment.
    pub placeholder_style: PlaceholderStyle,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            start_index: 1,
            placeholder_style: PlaceholderStyle::Dollar,
        }
    }
}

/// A pagination fragment with its two registered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    /// The `LIMIT … OFFSET …` fragment.
    pub sql: String,
    /// The limit and offset parameters, keyed `p{i}`.
    pub params: IndexMap<String, Value>,
    /// The index the next registered parameter should take.
    pub next_param_index: usize,
}

/// Build a `LIMIT`/`OFFSET` fragment with bound parameters.
///
/// The page form clamps the page to 1 and the size to `max_page_size`; the
/// offset form clamps only the limit.
pub fn build_pagination(request: &PageRequest, options: &PaginationOptions) -> Pagination {
    let (limit, offset) = match *request {
        PageRequest::Page { page, page_size } => {
            let size = page_size.min(options.max_page_size);
            let page = page.max(1);
            (size, (page - 1) * size)
        }
        PageRequest::Offset { offset, limit } => (limit.min(options.max_page_size), offset),
    };

    let limit_index = options.start_index;
    let offset_index = options.start_index + 1;
    let sql = format!(
        "LIMIT {} OFFSET {}",
        options.placeholder_style.placeholder(limit_index),
        options.placeholder_style.placeholder(offset_index)
    );

    let mut params = IndexMap::with_capacity(2);
    params.insert(param_key(limit_index), Value::Int(limit as i64));
    params.insert(param_key(offset_index), Value::Int(offset as i64));

    Pagination {
        sql,
        params,
        next_param_index: offset_index + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_form() {
        let page = build_pagination(
            &PageRequest::Page {
                page: 3,
                page_size: 25,
            },
            &PaginationOptions::default(),
        );
        assert_eq!(page.sql, "LIMIT $1 OFFSET $2");
        assert_eq!(page.params.get("p1"), Some(&Value::Int(25)));
        assert_eq!(page.params.get("p2"), Some(&Value::Int(50)));
        assert_eq!(page.next_param_index, 3);
    }

    #[test]
    fn test_offset_form() {
        let page = build_pagination(
            &PageRequest::Offset {
                offset: 40,
                limit: 20,
            },
            &PaginationOptions::default(),
        );
        assert_eq!(page.params.get("p1"), Some(&Value::Int(20)));
        assert_eq!(page.params.get("p2"), Some(&Value::Int(40)));
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let page = build_pagination(
            &PageRequest::Page {
                page: 0,
                page_size: 10,
            },
            &PaginationOptions::default(),
        );
        assert_eq!(page.params.get("p2"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_max_page_size_clamp() {
        let page = build_pagination(
            &PageRequest::Page {
                page: 2,
                page_size: 1000,
            },
            &PaginationOptions::default(),
        );
        assert_eq!(page.params.get("p1"), Some(&Value::Int(100)));
        assert_eq!(page.params.get("p2"), Some(&Value::Int(100)));
    }

    #[test]
    fn test_start_index_and_style() {
        let options = PaginationOptions {
            max_page_size: 100,
            start_index: 4,
            placeholder_style: PlaceholderStyle::At,
        };
        let page = build_pagination(
            &PageRequest::Offset {
                offset: 10,
                limit: 5,
            },
            &options,
        );
        assert_eq!(page.sql, "LIMIT @p4 OFFSET @p5");
        assert!(page.params.contains_key("p4"));
        assert!(page.params.contains_key("p5"));
        assert_eq!(page.next_param_index, 6);
    }

    #[test]
    fn test_question_style() {
        let options = PaginationOptions {
            placeholder_style: PlaceholderStyle::Question,
            ..Default::default()
        };
        let page = build_pagination(
            &PageRequest::Page {
                page: 1,
                page_size: 10,
            },
            &options,
        );
        assert_eq!(page.sql, "LIMIT ? OFFSET ?");
    }

    #[test]
    fn test_request_serde() {
        let request: PageRequest =
            serde_json::from_str(r#"{"page": 2, "pageSize": 25}"#).unwrap();
        assert_eq!(
            request,
            PageRequest::Page {
                page: 2,
                page_size: 25
            }
        );
        let request: PageRequest = serde_json::from_str(r#"{"offset": 10, "limit": 5}"#).unwrap();
        assert_eq!(
            request,
            PageRequest::Offset {
                offset: 10,
                limit: 5
            }
        );
    }
}
