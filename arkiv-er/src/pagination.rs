//! Listing windows for related-resource endpoints
//!
//! Listings are addressed by `(start, limit)` rather than page numbers so
//! clients can resume from any offset.

use serde::Deserialize;

/// Query parameters accepted by every listing endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WindowQuery {
    /// Zero-based offset of the first entry
    pub start: Option<u32>,
    /// Maximum number of entries to return
    pub limit: Option<u32>,
}

/// Sanitised listing window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Offset for SQL LIMIT/OFFSET query
    pub start: i64,
    /// Row count for SQL LIMIT/OFFSET query
    pub limit: i64,
}

/// Calculate the listing window from the requested one
///
/// - missing `start` means 0
/// - missing or zero `limit` means `default_limit`
/// - `limit` above `max_limit` is clamped to `max_limit`
///
/// # Examples
/// ```
/// use arkiv_er::pagination::{calculate_window, WindowQuery};
///
/// let w = calculate_window(WindowQuery { start: Some(40), limit: None }, 20, 100);
/// assert_eq!((w.start, w.limit), (40, 20));
///
/// // Oversized requests get clamped
/// let w = calculate_window(WindowQuery { start: None, limit: Some(5000) }, 20, 100);
/// assert_eq!((w.start, w.limit), (0, 100));
/// ```
pub fn calculate_window(query: WindowQuery, default_limit: u32, max_limit: u32) -> Window {
    let limit = match query.limit {
        None | Some(0) => default_limit,
        Some(requested) => requested,
    }
    .min(max_limit);

    Window {
        start: i64::from(query.start.unwrap_or(0)),
        limit: i64::from(limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<u32>, limit: Option<u32>) -> WindowQuery {
        WindowQuery { start, limit }
    }

    #[test]
    fn test_window_defaults() {
        let w = calculate_window(query(None, None), 20, 100);
        assert_eq!(w, Window { start: 0, limit: 20 });
    }

    #[test]
    fn test_window_explicit() {
        let w = calculate_window(query(Some(10), Some(5)), 20, 100);
        assert_eq!(w, Window { start: 10, limit: 5 });
    }

    #[test]
    fn test_window_zero_limit_means_default() {
        let w = calculate_window(query(Some(3), Some(0)), 20, 100);
        assert_eq!(w, Window { start: 3, limit: 20 });
    }

    #[test]
    fn test_window_clamped_to_max() {
        let w = calculate_window(query(None, Some(101)), 20, 100);
        assert_eq!(w.limit, 100);
    }

    #[test]
    fn test_window_default_clamped_to_max() {
        let w = calculate_window(query(None, None), 50, 10);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn test_window_large_start() {
        let w = calculate_window(query(Some(u32::MAX), Some(1)), 20, 100);
        assert_eq!(w.start, i64::from(u32::MAX));
    }
}
