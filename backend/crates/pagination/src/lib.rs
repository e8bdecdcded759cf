//! Offset pagination primitives shared by the drawings backend.
//!
//! A [`PageWindow`] is derived per request from the caller's `limit` and
//! `offset`. It is never persisted. Normalisation is lenient: a missing or
//! non-positive limit falls back to [`DEFAULT_LIMIT`] and a negative offset
//! is clamped to zero, so every window a handler sees is usable as-is.
//!
//! [`Page`] pairs the items read for a window with the collection total. The
//! total is counted independently of the page read, so under concurrent
//! writes the two may disagree; consumers should treat `total` as advisory.

use serde::Serialize;

/// Page size used when the caller omits `limit` or supplies a non-positive one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Normalised `limit`/`offset` pair.
///
/// ## Invariants
/// - `limit` is strictly positive.
/// - `offset` is non-negative.
///
/// # Examples
/// ```
/// use pagination::PageWindow;
///
/// let window = PageWindow::new(-5, -10);
/// assert_eq!(window, PageWindow::new(10, 0));
/// assert_eq!(window.limit(), 10);
/// assert_eq!(window.offset(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageWindow {
    limit: i64,
    offset: i64,
}

impl PageWindow {
    /// Build a window, normalising out-of-range values.
    #[must_use]
    pub const fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit };
        let offset = if offset < 0 { 0 } else { offset };
        Self { limit, offset }
    }

    /// Build a window from optional, already parsed values.
    ///
    /// # Examples
    /// ```
    /// use pagination::{DEFAULT_LIMIT, PageWindow};
    ///
    /// let window = PageWindow::from_parts(None, Some(20));
    /// assert_eq!(window.limit(), DEFAULT_LIMIT);
    /// assert_eq!(window.offset(), 20);
    /// ```
    #[must_use]
    pub fn from_parts(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self::new(limit.unwrap_or(DEFAULT_LIMIT), offset.unwrap_or(0))
    }

    /// Build a window from raw query-string values.
    ///
    /// Values that do not parse as integers are treated as absent.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageWindow;
    ///
    /// let window = PageWindow::from_query(Some("abc"), Some("5"));
    /// assert_eq!(window, PageWindow::new(10, 5));
    /// ```
    #[must_use]
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|value| value.trim().parse::<i64>().ok());
        Self::from_parts(parse(limit), parse(offset))
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of items skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    /// `limit` as a `usize`, saturating on narrow targets.
    #[must_use]
    pub fn limit_usize(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }

    /// `offset` as a `usize`, saturating on narrow targets.
    #[must_use]
    pub fn offset_usize(&self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

/// Items read for a [`PageWindow`] together with the collection total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    window: PageWindow,
}

impl<T> Page<T> {
    /// Assemble a page from its parts.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, window: PageWindow) -> Self {
        Self {
            items,
            total,
            window,
        }
    }

    /// Items in this page, in storage order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Total number of items in the collection when it was counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Window the page was read with.
    #[must_use]
    pub const fn window(&self) -> PageWindow {
        self.window
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Convert every item, keeping the total and window.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageWindow};
    ///
    /// let page = Page::new(vec![1, 2], 7, PageWindow::default());
    /// let mapped = page.map(|n| n * 10);
    /// assert_eq!(mapped.items(), &[10, 20]);
    /// assert_eq!(mapped.total(), 7);
    /// ```
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            window: self.window,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Normalisation rules for page windows.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-5, -10, 10, 0)]
    #[case(0, 0, 10, 0)]
    #[case(1, 0, 1, 0)]
    #[case(25, 40, 25, 40)]
    #[case(i64::MIN, i64::MIN, 10, 0)]
    fn new_normalises_values(
        #[case] limit: i64,
        #[case] offset: i64,
        #[case] expected_limit: i64,
        #[case] expected_offset: i64,
    ) {
        let window = PageWindow::new(limit, offset);
        assert_eq!(window.limit(), expected_limit);
        assert_eq!(window.offset(), expected_offset);
    }

    #[rstest]
    #[case(None, None, PageWindow::new(10, 0))]
    #[case(Some("3"), Some("6"), PageWindow::new(3, 6))]
    #[case(Some(" 4 "), None, PageWindow::new(4, 0))]
    #[case(Some("-1"), Some("-1"), PageWindow::new(10, 0))]
    #[case(Some("ten"), Some("1.5"), PageWindow::new(10, 0))]
    #[case(Some(""), Some(""), PageWindow::new(10, 0))]
    fn from_query_is_lenient(
        #[case] limit: Option<&str>,
        #[case] offset: Option<&str>,
        #[case] expected: PageWindow,
    ) {
        assert_eq!(PageWindow::from_query(limit, offset), expected);
    }

    #[rstest]
    fn default_window_matches_defaults() {
        assert_eq!(PageWindow::default(), PageWindow::new(DEFAULT_LIMIT, 0));
    }

    #[rstest]
    fn usize_views_match_values() {
        let window = PageWindow::new(7, 3);
        assert_eq!(window.limit_usize(), 7);
        assert_eq!(window.offset_usize(), 3);
    }

    #[rstest]
    fn page_serialises_window_fields() {
        let page = Page::new(vec!["a"], 1, PageWindow::new(2, 0));
        let value = serde_json::to_value(&page).expect("page serialises");
        assert_eq!(
            value,
            serde_json::json!({
                "items": ["a"],
                "total": 1,
                "window": {"limit": 2, "offset": 0}
            })
        );
    }
}
