use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::CandidateStore;
use crate::models::{CandidatePost, FeedCursor};

/// Candidate store over the posts read model.
#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    /// One query resolves the whole window: eligibility and privacy in the
    /// WHERE clause, author summary denormalized via the users join, and the
    /// cursor as a strict (created_at, id) upper bound. Postgres compares
    /// uuids bytewise, which matches `Uuid`'s `Ord`, so the SQL tiebreak and
    /// the in-memory tiebreak agree.
    async fn fetch_candidate_window(
        &self,
        viewer_id: Uuid,
        followed_author_ids: &[Uuid],
        cursor: Option<&FeedCursor>,
        window: u32,
    ) -> Result<Vec<CandidatePost>> {
        let candidates = sqlx::query_as::<_, CandidatePost>(
            r#"
            SELECT
                p.id,
                p.author_id,
                u.username AS author_username,
                u.display_name AS author_display_name,
                u.avatar_url AS author_avatar_url,
                p.caption,
                p.privacy,
                p.created_at,
                p.deleted_at,
                p.media_count,
                p.reaction_count,
                p.comment_count,
                p.reply_count
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.deleted_at IS NULL
              AND p.media_count > 0
              AND u.is_active = TRUE
              AND (
                  p.privacy = 'public'
                  OR p.author_id = $1
                  OR (p.privacy = 'followers_only' AND p.author_id = ANY($2))
              )
              AND (
                  $3::timestamptz IS NULL
                  OR p.created_at < $3
                  OR (p.created_at = $3 AND p.id < $4::uuid)
              )
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $5
            "#,
        )
        .bind(viewer_id)
        .bind(followed_author_ids)
        .bind(cursor.map(|c| c.created_at))
        .bind(cursor.map(|c| c.post_id))
        .bind(window as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }
}
