//! Feed scoring.
//!
//! Pure functions over already-fetched data; no I/O. The weights below are
//! behavioral constants of the product, deliberately not configuration: two
//! deployments of this service must rank identical inputs identically.
//!
//! Score per candidate:
//! - followed author boost (flat)
//! - affinity boost decaying with days since the viewer last interacted
//!   with the author (reaction or comment, whichever is most recent)
//! - engagement: reactions, top-level comments and replies, each weighted
//! - freshness boost, flat within the first hour, then inversely
//!   proportional to age in fractional hours

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::models::{CandidatePost, RankedCandidate};

/// Flat boost for posts authored by someone the viewer follows.
pub const FOLLOWED_AUTHOR_BOOST: f64 = 100.0;
/// Affinity boost at zero days since the last interaction.
pub const AFFINITY_BOOST_MAX: f64 = 40.0;
/// Freshness boost within the first hour of a post's life.
pub const FRESHNESS_BOOST_MAX: f64 = 50.0;
/// Engagement weight per reaction.
pub const REACTION_WEIGHT: f64 = 2.0;
/// Engagement weight per top-level comment.
pub const TOP_COMMENT_WEIGHT: f64 = 3.0;
/// Engagement weight per reply.
pub const REPLY_WEIGHT: f64 = 1.0;

const FRESHNESS_CLAMP_HOURS: f64 = 1.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn fractional_hours_since(earlier: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - earlier).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

fn fractional_days_since(earlier: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - earlier).num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn affinity_boost(days: f64) -> f64 {
    AFFINITY_BOOST_MAX / (1.0 + days.max(0.0))
}

fn freshness_boost(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = fractional_hours_since(created_at, now);
    if age_hours < FRESHNESS_CLAMP_HOURS {
        FRESHNESS_BOOST_MAX
    } else {
        FRESHNESS_BOOST_MAX / age_hours
    }
}

/// Compute the ranking score for one candidate.
///
/// `last_interaction_at` is the viewer's most recent reaction or comment on
/// any post by this candidate's author; `None` means no interaction history
/// and contributes nothing.
pub fn compute_score(
    candidate: &CandidatePost,
    is_followed: bool,
    last_interaction_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    let follow = if is_followed { FOLLOWED_AUTHOR_BOOST } else { 0.0 };

    let affinity = match last_interaction_at {
        Some(at) => affinity_boost(fractional_days_since(at, now)),
        None => 0.0,
    };

    let engagement = candidate.reaction_count as f64 * REACTION_WEIGHT
        + candidate.comment_count as f64 * TOP_COMMENT_WEIGHT
        + candidate.reply_count as f64 * REPLY_WEIGHT;

    follow + affinity + engagement + freshness_boost(candidate.created_at, now)
}

/// Total ranking order: score descending, then creation time descending,
/// then post id descending. NaN scores (defect inputs) compare as equal on
/// the score key and fall through to the deterministic tiebreaks.
pub fn rank_order(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    let by_score = match b.score.partial_cmp(&a.score) {
        Some(ord) => ord,
        None => {
            tracing::warn!(
                post_a = %a.post.id,
                post_b = %b.post.id,
                score_a = a.score,
                score_b = b.score,
                "Encountered NaN score while ranking, falling back to recency"
            );
            Ordering::Equal
        }
    };

    by_score
        .then_with(|| b.post.created_at.cmp(&a.post.created_at))
        .then_with(|| b.post.id.cmp(&a.post.id))
}
