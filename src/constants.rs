//! Limits and defaults shared with the ranking backend.

// std
use std::time::Duration as StdDuration;

/// Placeholder image shown when an item image fails to load.
pub const FALLBACK_IMAGE_SVG: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%22200%22 height=%22200%22%3E%3Crect fill=%22%23ddd%22 width=%22200%22 height=%22200%22/%3E%3Ctext x=%2250%25%22 y=%2250%25%22 dominant-baseline=%22middle%22 text-anchor=%22middle%22 fill=%22%23999%22 font-size=%2224%22%3ENo Image%3C/text%3E%3C/svg%3E";

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum password length accepted by the backend.
pub const MAX_PASSWORD_LENGTH: usize = 128;
/// Maximum item label length, in characters.
pub const MAX_ITEM_LABEL_LENGTH: usize = 200;
/// Maximum image URL length, in characters.
pub const MAX_IMAGE_URL_LENGTH: usize = 500;
/// Maximum ranking name length, in characters.
pub const MAX_RANKING_NAME_LENGTH: usize = 255;

/// Lowest value on the rating scale.
pub const RATING_SCALE_MIN: i64 = 0;
/// Highest value on the rating scale.
pub const RATING_SCALE_MAX: i64 = 10;
/// Initial rating for new items; the middle of the scale.
pub const DEFAULT_INIT_RATING: i64 = 5;

/// Quiet period for search inputs.
pub const SEARCH_DEBOUNCE: StdDuration = StdDuration::from_millis(300);

/// Lifetime of quick success notifications.
pub const TOAST_DURATION_SHORT: StdDuration = StdDuration::from_millis(2_000);
/// Lifetime of standard notifications.
pub const TOAST_DURATION_NORMAL: StdDuration = StdDuration::from_millis(3_000);
/// Lifetime of error notifications.
pub const TOAST_DURATION_LONG: StdDuration = StdDuration::from_millis(4_000);

/// Rows per page in paginated item tables.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;
/// Pairwise comparisons need at least this many items.
pub const MIN_ITEMS_FOR_RANKING: u64 = 2;
