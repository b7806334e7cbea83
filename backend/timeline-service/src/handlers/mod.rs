/// HTTP handlers for timeline endpoints
pub mod feed;

// Re-export handler functions at module level
pub use feed::{get_feed, FeedHandlerState, FeedQueryParams};
