use std::cmp::Ordering;

use super::Note;

/// Listing order: pinned notes first, then most recent `pinnedAt`, then most
/// recent `createdAt`. Timestamps compare as strings; a missing `pinnedAt`
/// compares as `""`.
pub fn listing_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| pinned_at_key(b).cmp(pinned_at_key(a)))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

fn pinned_at_key(note: &Note) -> &str {
    note.pinned_at.as_deref().unwrap_or("")
}
