//! Post visibility rules.
//!
//! The candidate query's WHERE clause mirrors this predicate; the feed
//! pipeline re-applies it to every fetched row so a store bug can never leak
//! a post the viewer is not allowed to see.

use uuid::Uuid;

use crate::models::{CandidatePost, Privacy};

/// Whether `post` may appear in `viewer_id`'s feed.
///
/// Deleted posts and posts without media are never visible, regardless of
/// privacy. Private posts are visible to their author only; an author
/// browsing their own feed does see their own private posts.
pub fn is_visible(post: &CandidatePost, viewer_id: Uuid, is_following_author: bool) -> bool {
    if post.deleted_at.is_some() || post.media_count <= 0 {
        return false;
    }

    match post.privacy {
        Privacy::Public => true,
        Privacy::FollowersOnly => post.author_id == viewer_id || is_following_author,
        Privacy::Private => post.author_id == viewer_id,
    }
}
