//! Default orderings applied whenever the caller supplies no comparator.
//!
//! Galleries and media items deliberately sort their creation time in
//! opposite directions: galleries are browsed oldest-stable-first, media is
//! browsed newest-first. `Option<i32>` gives the nulls-low priority rule for
//! free, since `None` orders before every `Some`.

use std::cmp::Ordering;

use crate::model::{Gallery, MediaItem};

/// Gallery order: priority ascending (missing priority lowest), then creation
/// time ascending, then name.
pub fn group_order(a: &Gallery, b: &Gallery) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.created.cmp(&b.created))
        .then_with(|| a.name.cmp(&b.name))
}

/// Media order: priority ascending (missing priority lowest), then creation
/// time descending (newest first), then name.
pub fn media_order(a: &MediaItem, b: &MediaItem) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.created.cmp(&a.created))
        .then_with(|| a.name.cmp(&b.name))
}
