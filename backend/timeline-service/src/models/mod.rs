use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience a post is shared with. Stored as lowercase text in the read model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Privacy {
    Public,
    FollowersOnly,
    Private,
}

/// One row of the candidate window: a post joined with its author's profile
/// summary and the denormalized engagement counters. Counters are owned by the
/// write-side services; this service only reads them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidatePost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_display_name: Option<String>,
    pub author_avatar_url: Option<String>,
    pub caption: Option<String>,
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub media_count: i32,
    pub reaction_count: i32,
    pub comment_count: i32,
    pub reply_count: i32,
}

/// A scored candidate, alive only for the duration of one feed request.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub post: CandidatePost,
    pub is_followed: bool,
    pub score: f64,
}

/// Pagination bookmark: creation time and id of the last item on a page.
/// Travels over the wire base64-encoded, see `services::pagination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub post_id: Uuid,
}

/// A single attached medium, ordered within a post by its own creation time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaItem {
    pub id: Uuid,
    pub post_id: Uuid,
    pub url: String,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
}

/// Author information for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaView {
    pub id: Uuid,
    pub url: String,
    pub media_type: String,
}

impl From<MediaItem> for MediaView {
    fn from(item: MediaItem) -> Self {
        MediaView {
            id: item.id,
            url: item.url,
            media_type: item.media_type,
        }
    }
}

/// Full post data for one feed item (matches the client FeedPostRaw shape)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPostView {
    pub id: Uuid,
    pub author: AuthorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ranking_score: f64,
    pub reaction_count: i32,
    pub comment_count: i32,
    pub reply_count: i32,
    /// Whether the requesting user has reacted to this post
    pub viewer_has_reacted: bool,
    /// Whether the requesting user authored this post
    pub viewer_is_author: bool,
    pub media: Vec<MediaView>,
}

/// One page of the ranked feed. `next_cursor` is absent on the final page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<RankedPostView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
