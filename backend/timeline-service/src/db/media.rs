use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::MediaStore;
use crate::models::MediaItem;

/// Media store over the post_media read model.
#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    async fn media_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<MediaItem>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = sqlx::query_as::<_, MediaItem>(
            r#"
            SELECT id, post_id, url, media_type, created_at
            FROM post_media
            WHERE post_id = ANY($1)
            ORDER BY post_id, created_at ASC, id ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        // Rows arrive ordered by (post_id, created_at, id), so pushing in
        // row order keeps each post's media list in a stable creation order
        // even when attachments from one upload share a timestamp.
        let mut by_post: HashMap<Uuid, Vec<MediaItem>> = HashMap::new();
        for item in items {
            by_post.entry(item.post_id).or_default().push(item);
        }

        Ok(by_post)
    }
}
