use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::db::InteractionStore;

/// Interaction-history store over the reactions and comments read models.
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn last_reaction_times(
        &self,
        viewer_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, DateTime<Utc>>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT p.author_id, MAX(r.created_at)
            FROM reactions r
            JOIN posts p ON p.id = r.post_id
            WHERE r.user_id = $1 AND p.author_id = ANY($2)
            GROUP BY p.author_id
            "#,
        )
        .bind(viewer_id)
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn last_comment_times(
        &self,
        viewer_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, DateTime<Utc>>> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT p.author_id, MAX(c.created_at)
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE c.user_id = $1 AND p.author_id = ANY($2)
            GROUP BY p.author_id
            "#,
        )
        .bind(viewer_id)
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

/// Merge two per-author timestamp maps, keeping the most recent entry for
/// each author. Commutative, so the reaction/comment lookup order never
/// affects the result.
fn merge_latest(
    mut into: HashMap<Uuid, DateTime<Utc>>,
    from: HashMap<Uuid, DateTime<Utc>>,
) -> HashMap<Uuid, DateTime<Utc>> {
    for (author_id, at) in from {
        into.entry(author_id)
            .and_modify(|existing| {
                if at > *existing {
                    *existing = at;
                }
            })
            .or_insert(at);
    }
    into
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    async fn last_interactions_by_author(
        &self,
        viewer_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, DateTime<Utc>>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let (reactions, comments) = tokio::join!(
            self.last_reaction_times(viewer_id, author_ids),
            self.last_comment_times(viewer_id, author_ids),
        );

        Ok(merge_latest(reactions?, comments?))
    }

    async fn reacted_post_ids(
        &self,
        viewer_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let reacted: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT post_id
            FROM reactions
            WHERE user_id = $1 AND post_id = ANY($2)
            "#,
        )
        .bind(viewer_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(reacted.into_iter().collect())
    }
}
