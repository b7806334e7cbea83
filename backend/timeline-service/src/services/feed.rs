//! Feed pipeline orchestration.
//!
//! One `get_feed` call runs the whole pipeline against a single `now`
//! snapshot: resolve the follow set, fetch a recency-bounded candidate
//! window, resolve affinity for the window's authors, score and rank, cut
//! one page, then hydrate media and viewer flags for that page only.
//! Nothing is cached between requests; identical store state and `now`
//! yield an identical page.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::db::{CandidateStore, FollowStore, InteractionStore, MediaStore};
use crate::error::{AppError, Result};
use crate::metrics::FEED_CANDIDATE_WINDOW_ROWS;
use crate::models::{AuthorSummary, FeedPage, MediaView, RankedCandidate, RankedPostView};
use crate::services::{pagination, scoring, visibility};

pub struct FeedService {
    candidates: Arc<dyn CandidateStore>,
    follows: Arc<dyn FollowStore>,
    interactions: Arc<dyn InteractionStore>,
    media: Arc<dyn MediaStore>,
    default_page_size: u32,
    max_page_size: u32,
}

impl FeedService {
    pub fn new(
        candidates: Arc<dyn CandidateStore>,
        follows: Arc<dyn FollowStore>,
        interactions: Arc<dyn InteractionStore>,
        media: Arc<dyn MediaStore>,
        config: FeedConfig,
    ) -> Self {
        Self {
            candidates,
            follows,
            interactions,
            media,
            default_page_size: config.default_page_size.max(1),
            max_page_size: config.max_page_size.max(1),
        }
    }

    /// Build one feed page for the viewer.
    pub async fn get_feed(
        &self,
        viewer_id: Uuid,
        cursor: Option<&str>,
        limit: Option<u32>,
        cancel: &CancellationToken,
    ) -> Result<FeedPage> {
        self.get_feed_at(viewer_id, cursor, limit, cancel, Utc::now())
            .await
    }

    /// Build one feed page against an explicit `now`. Every freshness and
    /// affinity computation in the request uses this single timestamp.
    pub async fn get_feed_at(
        &self,
        viewer_id: Uuid,
        cursor: Option<&str>,
        limit: Option<u32>,
        cancel: &CancellationToken,
        now: DateTime<Utc>,
    ) -> Result<FeedPage> {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);
        let cursor = cursor.and_then(pagination::decode_cursor);
        let window = pagination::candidate_window_size(limit);

        debug!(
            "building feed page: viewer={} limit={} window={} cursor={}",
            viewer_id,
            limit,
            window,
            cursor.is_some()
        );

        let followed = run_stage(
            cancel,
            "follow graph lookup",
            self.follows.followed_author_ids(viewer_id),
        )
        .await?;
        let followed_vec: Vec<Uuid> = followed.iter().copied().collect();

        let rows = run_stage(
            cancel,
            "candidate window fetch",
            self.candidates
                .fetch_candidate_window(viewer_id, &followed_vec, cursor.as_ref(), window),
        )
        .await?;

        // A short window means the store ran out of older posts, so this
        // page is the last one.
        let window_exhausted = (rows.len() as u32) < window;
        FEED_CANDIDATE_WINDOW_ROWS.observe(rows.len() as f64);

        // The candidate query already enforces visibility; re-check every
        // row so a store defect cannot leak a post into the feed.
        let fetched = rows.len();
        let visible: Vec<_> = rows
            .into_iter()
            .filter(|post| visibility::is_visible(post, viewer_id, followed.contains(&post.author_id)))
            .collect();
        if visible.len() < fetched {
            warn!(
                "candidate store returned {} ineligible rows for viewer {}",
                fetched - visible.len(),
                viewer_id
            );
        }

        let author_ids: Vec<Uuid> = visible
            .iter()
            .map(|post| post.author_id)
            .filter(|author_id| *author_id != viewer_id && !author_id.is_nil())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let last_interactions = run_stage(
            cancel,
            "affinity lookup",
            self.interactions
                .last_interactions_by_author(viewer_id, &author_ids),
        )
        .await?;

        let mut ranked: Vec<RankedCandidate> = visible
            .into_iter()
            .map(|post| {
                let is_followed = followed.contains(&post.author_id);
                let score = scoring::compute_score(
                    &post,
                    is_followed,
                    last_interactions.get(&post.author_id).copied(),
                    now,
                );
                RankedCandidate {
                    post,
                    is_followed,
                    score,
                }
            })
            .collect();
        ranked.sort_by(scoring::rank_order);

        let (page, next_cursor) = pagination::paginate(ranked, limit as usize, window_exhausted);

        if page.is_empty() {
            debug!("feed page empty for viewer {}", viewer_id);
            return Ok(FeedPage {
                items: vec![],
                next_cursor: None,
            });
        }

        // Hydrate the final page only. The window itself never touches the
        // media store.
        let page_ids: Vec<Uuid> = page.iter().map(|c| c.post.id).collect();
        let (mut media_by_post, reacted) = run_stage(cancel, "page hydration", async {
            tokio::try_join!(
                self.media.media_for_posts(&page_ids),
                self.interactions.reacted_post_ids(viewer_id, &page_ids),
            )
        })
        .await?;

        let items: Vec<RankedPostView> = page
            .into_iter()
            .map(|candidate| {
                let post = candidate.post;
                let media = media_by_post
                    .remove(&post.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(MediaView::from)
                    .collect();

                RankedPostView {
                    id: post.id,
                    author: AuthorSummary {
                        id: post.author_id,
                        username: post.author_username,
                        display_name: post.author_display_name,
                        avatar_url: post.author_avatar_url,
                    },
                    caption: post.caption,
                    created_at: post.created_at,
                    ranking_score: candidate.score,
                    reaction_count: post.reaction_count,
                    comment_count: post.comment_count,
                    reply_count: post.reply_count,
                    viewer_has_reacted: reacted.contains(&post.id),
                    viewer_is_author: post.author_id == viewer_id,
                    media,
                }
            })
            .collect();

        debug!(
            "feed page built: viewer={} items={} has_next={}",
            viewer_id,
            items.len(),
            next_cursor.is_some()
        );

        Ok(FeedPage { items, next_cursor })
    }
}

/// Race one pipeline stage against cancellation. A fired token wins
/// immediately, so a cancelled request never assembles a partial page; a
/// store failure maps to `Unavailable`.
async fn run_stage<T, F>(cancel: &CancellationToken, stage: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("feed request cancelled during {}", stage);
            Err(AppError::Cancelled)
        }
        result = fut => result.map_err(|e| {
            warn!("{} failed: {:#}", stage, e);
            AppError::Unavailable(format!("{} failed", stage))
        }),
    }
}
