use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::db::FollowStore;

/// Follow-graph store over the follows read model.
#[derive(Clone)]
pub struct PgFollowStore {
    pool: PgPool,
}

impl PgFollowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowStore for PgFollowStore {
    async fn followed_author_ids(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>> {
        let followee_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT followee_id
            FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(followee_ids.into_iter().collect())
    }
}
