//! Next/previous navigation between sibling videos.
//!
//! Uses the same `(position, id)` total order as the unlock machine so
//! navigation and unlocking never disagree about who the neighbor is.
//! Boundary videos have no neighbor on that side; that is a valid
//! answer, not an error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::types::CourseVideo;
use crate::catalog::unlock::sibling_order;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoNav {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
}

impl From<&CourseVideo> for VideoNav {
    fn from(video: &CourseVideo) -> Self {
        Self {
            id: video.id,
            name: video.name.clone(),
            position: video.position,
        }
    }
}

/// Returns `(previous, next)` for the given video among its siblings, or
/// `None` when the video is not among them.
pub fn neighbors(
    videos: &[CourseVideo],
    video_id: Uuid,
) -> Option<(Option<VideoNav>, Option<VideoNav>)> {
    let ordered = sibling_order(videos);
    let index = ordered.iter().position(|video| video.id == video_id)?;
    let previous = index.checked_sub(1).map(|i| VideoNav::from(ordered[i]));
    let next = ordered.get(index + 1).map(|video| VideoNav::from(*video));
    Some((previous, next))
}
