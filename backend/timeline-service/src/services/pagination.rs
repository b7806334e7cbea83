//! Cursor codec and page assembly.
//!
//! The cursor is a recency bookmark, not a rank bookmark: it carries the
//! creation time and id of the last item on the page, base64-encoded as
//! `"<unix_nanos>:<post_id>"`. The next request fetches a fresh candidate
//! window strictly before that position and re-ranks it. Nanosecond
//! precision round-trips any `DateTime<Utc>` exactly, so a decoded boundary
//! compares equal to the row it was minted from and the tie clause of the
//! strict-before filter still discriminates on the id.

use base64::{engine::general_purpose, Engine as _};
use chrono::DateTime;
use tracing::debug;
use uuid::Uuid;

use crate::models::{FeedCursor, RankedCandidate};

/// Candidate window size per page of `limit` items.
pub const CANDIDATE_WINDOW_MULTIPLIER: u32 = 12;
/// Window floor, so small pages still rank over a meaningful pool.
pub const CANDIDATE_WINDOW_MIN: u32 = 120;
/// Window cap, the per-request resource bound.
pub const CANDIDATE_WINDOW_MAX: u32 = 600;

/// Number of candidate rows to fetch for a page of `limit` items.
pub fn candidate_window_size(limit: u32) -> u32 {
    limit
        .saturating_mul(CANDIDATE_WINDOW_MULTIPLIER)
        .clamp(CANDIDATE_WINDOW_MIN, CANDIDATE_WINDOW_MAX)
}

/// Encode a cursor for the wire.
pub fn encode_cursor(cursor: &FeedCursor) -> String {
    // i64 nanoseconds cover 1677..=2262; instants outside clamp to the edge.
    let nanos = cursor.created_at.timestamp_nanos_opt().unwrap_or(i64::MAX);
    let raw = format!("{}:{}", nanos, cursor.post_id);
    general_purpose::STANDARD.encode(raw)
}

/// Decode a wire cursor. Anything that does not parse is treated as absent,
/// so a stale or corrupted bookmark degrades to the first page instead of
/// failing the request.
pub fn decode_cursor(raw: &str) -> Option<FeedCursor> {
    if raw.is_empty() {
        return None;
    }

    let decoded = match general_purpose::STANDARD.decode(raw) {
        Ok(bytes) => bytes,
        Err(_) => {
            debug!("ignoring cursor with invalid base64");
            return None;
        }
    };
    let cursor_str = match String::from_utf8(decoded) {
        Ok(s) => s,
        Err(_) => {
            debug!("ignoring cursor with invalid encoding");
            return None;
        }
    };

    let (nanos_str, post_id_str) = cursor_str.split_once(':')?;
    let nanos = nanos_str.parse::<i64>().ok()?;
    let created_at = DateTime::from_timestamp_nanos(nanos);
    let post_id = Uuid::parse_str(post_id_str).ok()?;

    Some(FeedCursor {
        created_at,
        post_id,
    })
}

/// Truncate the ranked candidates to one page and derive the next cursor.
///
/// A cursor is only emitted when the fetch filled the whole window: a short
/// window means the store ran out of older candidates, so the page (even a
/// partial one) is the last page.
pub fn paginate(
    mut ranked: Vec<RankedCandidate>,
    limit: usize,
    window_exhausted: bool,
) -> (Vec<RankedCandidate>, Option<String>) {
    ranked.truncate(limit);

    let next_cursor = if window_exhausted {
        None
    } else {
        ranked.last().map(|last| {
            encode_cursor(&FeedCursor {
                created_at: last.post.created_at,
                post_id: last.post.id,
            })
        })
    };

    (ranked, next_cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidatePost, Privacy};
    use chrono::{Duration, Utc};

    fn ranked_at(id: Uuid, created_at: chrono::DateTime<Utc>, score: f64) -> RankedCandidate {
        RankedCandidate {
            post: CandidatePost {
                id,
                author_id: Uuid::new_v4(),
                author_username: "author".to_string(),
                author_display_name: None,
                author_avatar_url: None,
                caption: None,
                privacy: Privacy::Public,
                created_at,
                deleted_at: None,
                media_count: 1,
                reaction_count: 0,
                comment_count: 0,
                reply_count: 0,
            },
            is_followed: false,
            score,
        }
    }

    #[test]
    fn window_size_is_clamped() {
        assert_eq!(candidate_window_size(1), 120);
        assert_eq!(candidate_window_size(10), 120);
        assert_eq!(candidate_window_size(20), 240);
        assert_eq!(candidate_window_size(50), 600);
        assert_eq!(candidate_window_size(1000), 600);
    }

    #[test]
    fn cursor_roundtrip_preserves_position() {
        // Carries a sub-microsecond tail, finer than timestamptz emits.
        let cursor = FeedCursor {
            created_at: DateTime::from_timestamp_nanos(1_700_000_123_456_789_123),
            post_id: Uuid::from_u128(42),
        };

        let decoded = decode_cursor(&encode_cursor(&cursor)).unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn malformed_cursors_decode_as_absent() {
        assert_eq!(decode_cursor(""), None);
        assert_eq!(decode_cursor("not-base64!!!"), None);
        // valid base64, no separator
        assert_eq!(decode_cursor(&general_purpose::STANDARD.encode("12345")), None);
        // bad timestamp
        assert_eq!(
            decode_cursor(&general_purpose::STANDARD.encode("abc:00000000-0000-0000-0000-000000000001")),
            None
        );
        // bad uuid
        assert_eq!(
            decode_cursor(&general_purpose::STANDARD.encode("1700000000000000000:nope")),
            None
        );
    }

    #[test]
    fn full_window_emits_cursor_of_last_page_item() {
        let now = Utc::now();
        let ranked: Vec<RankedCandidate> = (0..5)
            .map(|i| {
                ranked_at(
                    Uuid::from_u128(i as u128 + 1),
                    now - Duration::minutes(i),
                    100.0 - i as f64,
                )
            })
            .collect();
        let last_kept = ranked[2].clone();

        let (page, cursor) = paginate(ranked, 3, false);

        assert_eq!(page.len(), 3);
        let decoded = decode_cursor(&cursor.unwrap()).unwrap();
        assert_eq!(decoded.post_id, last_kept.post.id);
        assert_eq!(decoded.created_at, last_kept.post.created_at);
    }

    #[test]
    fn exhausted_window_omits_cursor_even_when_page_is_full() {
        let now = Utc::now();
        let ranked: Vec<RankedCandidate> = (0..5)
            .map(|i| ranked_at(Uuid::from_u128(i as u128 + 1), now - Duration::minutes(i), 1.0))
            .collect();

        let (page, cursor) = paginate(ranked, 3, true);

        assert_eq!(page.len(), 3);
        assert_eq!(cursor, None);
    }

    #[test]
    fn empty_candidates_produce_empty_page_without_cursor() {
        let (page, cursor) = paginate(Vec::new(), 20, false);

        assert!(page.is_empty());
        assert_eq!(cursor, None);
    }
}
