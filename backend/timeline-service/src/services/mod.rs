/// Business logic layer for timeline-service
///
/// This module provides the feed pipeline stages:
/// - visibility: Privacy and eligibility rules for candidate posts
/// - scoring: Deterministic ranking score and total ordering
/// - pagination: Candidate window sizing and opaque cursors
/// - feed: Orchestration of one feed request end to end
pub mod feed;
pub mod pagination;
pub mod scoring;
pub mod visibility;

// Re-export commonly used services
pub use feed::FeedService;
