//! Progressive unlock state machine.
//!
//! Per (student, video) the machine projects a lock state and a
//! completion state from the sibling ordering and the student's progress
//! rows. The projection is recomputed from current rows on every read and
//! is never persisted, so corrected progress data self-heals on the next
//! query.
//!
//! Siblings are totally ordered by `(position, id)`; the id tie-break
//! makes the predecessor deterministic when two videos share a position.
//! The first video in that order is never locked, for any viewer. Every
//! later video unlocks only once the student's progress row for its
//! immediate predecessor reports `is_completed`. Without a student id,
//! everything past the first video stays locked: structure is visible,
//! playback is not.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::types::{CourseVideo, VideoProgress};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
}

/// Orthogonal to [`LockState`]; classified from `completion_percentage`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlaybackState {
    pub video_id: Uuid,
    pub lock_state: LockState,
    pub completion_state: CompletionState,
}

pub fn completion_state(progress: Option<&VideoProgress>) -> CompletionState {
    match progress {
        None => CompletionState::Pending,
        Some(row) => match row.completion_percentage {
            0 => CompletionState::Pending,
            100 => CompletionState::Completed,
            _ => CompletionState::InProgress,
        },
    }
}

/// Sibling videos in `(position, id)` order. Callers must pass only
/// active, non-deleted rows of one topic.
pub fn sibling_order(videos: &[CourseVideo]) -> Vec<&CourseVideo> {
    let mut ordered: Vec<&CourseVideo> = videos.iter().collect();
    ordered.sort_by_key(|video| (video.position, video.id));
    ordered
}

/// Projects playback state for every sibling, returned in sibling order.
///
/// `progress` must hold only the viewing student's rows, keyed by video
/// id; pass an empty map (and `None` for `student_id`) for anonymous
/// viewers.
pub fn project(
    videos: &[CourseVideo],
    progress: &HashMap<Uuid, VideoProgress>,
    student_id: Option<Uuid>,
) -> Vec<PlaybackState> {
    let ordered = sibling_order(videos);
    ordered
        .iter()
        .enumerate()
        .map(|(index, video)| {
            let lock_state = if index == 0 {
                LockState::Unlocked
            } else if student_id.is_none() {
                LockState::Locked
            } else {
                let predecessor = ordered[index - 1];
                match progress.get(&predecessor.id) {
                    Some(row) if row.is_completed => LockState::Unlocked,
                    _ => LockState::Locked,
                }
            };
            PlaybackState {
                video_id: video.id,
                lock_state,
                completion_state: completion_state(progress.get(&video.id)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn video(id: u128, position: i32) -> CourseVideo {
        let now = Utc::now();
        CourseVideo {
            id: Uuid::from_u128(id),
            topic_id: Uuid::from_u128(0xB0),
            name: format!("video-{id}"),
            description: None,
            video_url: None,
            duration_seconds: 300,
            position,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn progress_row(video_id: Uuid, percentage: i32, completed: bool) -> VideoProgress {
        VideoProgress {
            id: Uuid::new_v4(),
            student_id: Uuid::from_u128(0x5),
            video_id,
            completion_percentage: percentage,
            is_completed: completed,
            last_watched_at: Utc::now(),
        }
    }

    fn progress_map(rows: Vec<VideoProgress>) -> HashMap<Uuid, VideoProgress> {
        rows.into_iter().map(|row| (row.video_id, row)).collect()
    }

    fn student() -> Option<Uuid> {
        Some(Uuid::from_u128(0x5))
    }

    #[test]
    fn test_first_video_never_locked() {
        let videos = vec![video(3, 30), video(1, 10), video(2, 20)];
        let empty = HashMap::new();

        for viewer in [None, student()] {
            let states = project(&videos, &empty, viewer);
            assert_eq!(states[0].video_id, Uuid::from_u128(1));
            assert_eq!(states[0].lock_state, LockState::Unlocked);
        }
    }

    #[test]
    fn test_sequential_unlock_follows_predecessor_completion() {
        // Positions [1,2,3] = A,B,C; only A is completed.
        let a = video(1, 1);
        let b = video(2, 2);
        let c = video(3, 3);
        let videos = vec![a.clone(), b.clone(), c.clone()];
        let progress = progress_map(vec![progress_row(a.id, 100, true)]);

        let states = project(&videos, &progress, student());
        assert_eq!(states[0].lock_state, LockState::Unlocked);
        assert_eq!(states[0].completion_state, CompletionState::Completed);
        assert_eq!(states[1].lock_state, LockState::Unlocked);
        assert_eq!(states[1].completion_state, CompletionState::Pending);
        assert_eq!(states[2].lock_state, LockState::Locked);

        // B completes; the very next read reports C unlocked and pending.
        let progress = progress_map(vec![
            progress_row(a.id, 100, true),
            progress_row(b.id, 100, true),
        ]);
        let states = project(&videos, &progress, student());
        assert_eq!(states[2].lock_state, LockState::Unlocked);
        assert_eq!(states[2].completion_state, CompletionState::Pending);
    }

    #[test]
    fn test_anonymous_viewer_sees_only_first_video_unlocked() {
        let videos = vec![video(1, 1), video(2, 2), video(3, 3)];
        // Stored progress belongs to some student; the engine never hands
        // it to an anonymous projection, which receives an empty map.
        let states = project(&videos, &HashMap::new(), None);
        assert_eq!(states[0].lock_state, LockState::Unlocked);
        assert_eq!(states[1].lock_state, LockState::Locked);
        assert_eq!(states[2].lock_state, LockState::Locked);
        assert!(states
            .iter()
            .all(|s| s.completion_state == CompletionState::Pending));
    }

    #[test]
    fn test_students_do_not_affect_each_other() {
        let a = video(1, 1);
        let b = video(2, 2);
        let videos = vec![a.clone(), b.clone()];

        let with_progress = progress_map(vec![progress_row(a.id, 100, true)]);
        let without_progress = HashMap::new();

        let first = project(&videos, &with_progress, student());
        let second = project(&videos, &without_progress, Some(Uuid::from_u128(0x6)));
        assert_eq!(first[1].lock_state, LockState::Unlocked);
        assert_eq!(second[1].lock_state, LockState::Locked);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let videos = vec![video(1, 5), video(2, 7), video(3, 9)];
        let progress = progress_map(vec![progress_row(Uuid::from_u128(1), 40, false)]);

        let first = project(&videos, &progress, student());
        let second = project(&videos, &progress, student());
        assert_eq!(first, second);
    }

    #[test]
    fn test_positions_need_not_be_contiguous() {
        let a = video(1, 10);
        let b = video(2, 200);
        let videos = vec![b.clone(), a.clone()];
        let progress = progress_map(vec![progress_row(a.id, 100, true)]);

        let states = project(&videos, &progress, student());
        assert_eq!(states[1].video_id, b.id);
        assert_eq!(states[1].lock_state, LockState::Unlocked);
    }

    #[test]
    fn test_duplicate_positions_break_ties_by_id() {
        // Two videos share position 1; the lower id is the predecessor.
        let first = video(1, 1);
        let tied = video(2, 1);
        let last = video(3, 2);
        let videos = vec![tied.clone(), last.clone(), first.clone()];

        let ordered: Vec<Uuid> = sibling_order(&videos).iter().map(|v| v.id).collect();
        assert_eq!(ordered, vec![first.id, tied.id, last.id]);

        // Completing the lower-id twin unlocks the higher-id twin's
        // successor chain deterministically.
        let progress = progress_map(vec![progress_row(first.id, 100, true)]);
        let states = project(&videos, &progress, student());
        assert_eq!(states[1].video_id, tied.id);
        assert_eq!(states[1].lock_state, LockState::Unlocked);
        assert_eq!(states[2].lock_state, LockState::Locked);
    }

    #[test]
    fn test_completion_classification_boundaries() {
        assert_eq!(completion_state(None), CompletionState::Pending);

        let vid = Uuid::from_u128(1);
        assert_eq!(
            completion_state(Some(&progress_row(vid, 0, false))),
            CompletionState::Pending
        );
        assert_eq!(
            completion_state(Some(&progress_row(vid, 1, false))),
            CompletionState::InProgress
        );
        assert_eq!(
            completion_state(Some(&progress_row(vid, 99, false))),
            CompletionState::InProgress
        );
        assert_eq!(
            completion_state(Some(&progress_row(vid, 100, true))),
            CompletionState::Completed
        );
    }

    #[test]
    fn test_empty_topic_projects_nothing() {
        let states = project(&[], &HashMap::new(), student());
        assert!(states.is_empty());
    }
}
