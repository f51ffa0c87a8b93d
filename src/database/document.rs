use std::cmp::Ordering;

use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::object_id::ObjectId;

/// A record kept in one collection of the store.
///
/// `Draft` is a validated create payload, `Changes` a validated partial
/// update, `Filter` a validated list query. Stores mint ids and timestamps;
/// the document only knows how to assemble and merge itself.
pub trait Document: Clone + Send + Sync + 'static {
    type Draft: Send + 'static;
    type Changes: Send + 'static;
    type Filter: Send + Sync + 'static;

    fn id(&self) -> &ObjectId;

    fn updated_at(&self) -> DateTime<Utc>;

    fn from_draft(id: ObjectId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merge `changes` into `self` and stamp `updated_at`
    fn apply(&mut self, changes: Self::Changes, updated_at: DateTime<Utc>);

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Value of the collection's unique key, if it has one
    fn unique_key(&self) -> Option<&str> {
        None
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.id().cmp(b.id())
    }
}

/// Current time at the store's precision (milliseconds)
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// `updated_at` for a mutation at `now`: never earlier than, and never equal
/// to, the previous value.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::milliseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}
