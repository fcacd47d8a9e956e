//! Pagination utilities for Metasys API responses.
//!
//! List endpoints return `{"items": [...], "next": <url|null>, "total": n}`.
//! Decoding is deliberately lenient: a page with missing or wrong-shaped
//! `items` is logged and treated as the final page, and malformed elements
//! are skipped, so one bad page never aborts a whole traversal.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A page of results from the Metasys API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Continuation link to the next page, if any.
    pub next: Option<String>,
    /// Total number of items across all pages (if reported).
    pub total: Option<u64>,
    /// Current page number (1-indexed).
    pub page: u32,
}

impl<T: DeserializeOwned> Page<T> {
    /// Decode a page from a raw response body.
    ///
    /// Missing or non-array `items` yields an empty final page; elements
    /// that fail to deserialize are skipped. Both cases are logged.
    pub fn from_value(value: &Value, page: u32) -> Self {
        let Some(raw_items) = value.get("items").and_then(Value::as_array) else {
            tracing::warn!(page, "page response has no well-formed 'items', stopping here");
            return Self {
                items: Vec::new(),
                next: None,
                total: None,
                page,
            };
        };

        let mut items = Vec::with_capacity(raw_items.len());
        for raw in raw_items {
            match serde_json::from_value(raw.clone()) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(page, error = %err, "skipping malformed page item");
                }
            }
        }

        Self {
            items,
            next: value
                .get("next")
                .and_then(Value::as_str)
                .map(str::to_string),
            total: value.get("total").and_then(Value::as_u64),
            page,
        }
    }
}

impl<T> Page<T> {
    /// Whether a continuation link to another page exists.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
            total: self.total,
            page: self.page,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_decode() {
        let value = json!({
            "items": [1, 2, 3],
            "next": "https://host/api/v4/networkDevices?page=2",
            "total": 7,
        });
        let page: Page<i32> = Page::from_value(&value, 1);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.has_more());
        assert_eq!(page.total, Some(7));
    }

    #[test]
    fn test_page_null_next_is_final() {
        let value = json!({ "items": [1], "next": null });
        let page: Page<i32> = Page::from_value(&value, 3);
        assert!(!page.has_more());
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_page_missing_items_is_empty_final_page() {
        let value = json!({ "next": "https://host/whatever" });
        let page: Page<i32> = Page::from_value(&value, 1);
        assert!(page.is_empty());
        assert!(!page.has_more());

        let value = json!({ "items": "oops" });
        let page: Page<i32> = Page::from_value(&value, 1);
        assert!(page.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn test_page_skips_malformed_elements() {
        let value = json!({ "items": [1, "two", 3], "next": null });
        let page: Page<i32> = Page::from_value(&value, 1);
        assert_eq!(page.items, vec![1, 3]);
    }

    #[test]
    fn test_page_map() {
        let value = json!({ "items": [1, 2, 3], "next": null });
        let page: Page<i32> = Page::from_value(&value, 1);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.page, 1);
    }
}
