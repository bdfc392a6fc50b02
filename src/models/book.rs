//! Book model and related types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_PAGE: usize = 1;

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
}

/// Title/author pair as supplied in a request body.
///
/// A field is considered present only when it is a non-empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct BookFields {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookFields {
    pub fn from_body(body: &Value) -> Self {
        Self {
            title: present_str(body, "title"),
            author: present_str(body, "author"),
        }
    }

    /// Both fields, or `None` if either is missing
    pub fn complete(self) -> Option<(String, String)> {
        Some((self.title?, self.author?))
    }
}

fn present_str(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Query parameters for listing books.
///
/// Kept as raw strings: a malformed number falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub author: Option<String>,
}

impl BookQuery {
    /// Build from decoded query pairs. The first occurrence of a key wins;
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut query.limit,
                "page" => &mut query.page,
                "author" => &mut query.author,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// Effective `(page, limit)`
    pub fn pagination(&self) -> (usize, usize) {
        (
            positive_or(self.page.as_deref(), DEFAULT_PAGE),
            positive_or(self.limit.as_deref(), DEFAULT_LIMIT),
        )
    }

    /// Author filter, ignoring an empty value
    pub fn author_filter(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.is_empty())
    }
}

fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}
