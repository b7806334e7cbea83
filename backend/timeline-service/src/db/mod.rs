//! Collaborator seams for the feed pipeline.
//!
//! The ranking engine only ever talks to the posts, follow-graph,
//! interaction and media stores through these traits; the `Pg*` types in the
//! sibling modules are the production implementations over the shared
//! PostgreSQL read model, and tests substitute in-memory implementations.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{CandidatePost, FeedCursor, MediaItem};

pub mod follows;
pub mod interactions;
pub mod media;
pub mod posts;

pub use follows::PgFollowStore;
pub use interactions::PgInteractionStore;
pub use media::PgMediaStore;
pub use posts::PgCandidateStore;

/// Source of feed candidates.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Fetch up to `window` eligible posts, newest first, strictly before
    /// `cursor` when one is given.
    ///
    /// Eligibility: not deleted, has media, author account active, and the
    /// post's privacy admits the viewer. `followed_author_ids` is passed in
    /// rather than re-derived so the privacy filter and the scoring flag are
    /// guaranteed to see the same follow-graph snapshot.
    async fn fetch_candidate_window(
        &self,
        viewer_id: Uuid,
        followed_author_ids: &[Uuid],
        cursor: Option<&FeedCursor>,
        window: u32,
    ) -> Result<Vec<CandidatePost>>;
}

/// Read access to the follow graph.
#[async_trait]
pub trait FollowStore: Send + Sync {
    /// All authors the viewer follows. Resolved once per request; the
    /// privacy filter and the scoring flag both read this one snapshot.
    async fn followed_author_ids(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>>;
}

/// Read access to the viewer's interaction history.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// For each of the given authors, the timestamp of the viewer's most
    /// recent interaction (reaction or comment) with any of that author's
    /// posts. Authors the viewer never interacted with are absent.
    async fn last_interactions_by_author(
        &self,
        viewer_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, DateTime<Utc>>>;

    /// Which of the given posts the viewer has reacted to.
    async fn reacted_post_ids(
        &self,
        viewer_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>>;
}

/// Read access to post media.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Media for the given posts, ordered within each post by creation time
    /// with the id breaking ties. Posts without media are simply absent from
    /// the map.
    async fn media_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<MediaItem>>>;
}
