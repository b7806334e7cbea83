//! timeline-service
//!
//! Read-side service that assembles the ranked home timeline. Candidates
//! come from a Postgres read model maintained by the write-side services;
//! ranking is computed per request and nothing is cached between requests.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::FeedService;
