//! Plain data records persisted by the ledger
//!
//! An `id` of 0 marks a record that has not been stored yet; the store assigns
//! the real id on first save.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Ranking value of an event that holds no purchased slot
pub const UNRANKED: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    /// Remaining votes this user may cast
    pub vote_budget: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub keyword: String,
    pub vote_count: i64,
    /// Purchased 1-based slot, or `UNRANKED`
    pub ranking: u32,
    /// User who submitted the event
    pub user_id: i64,
}

impl Event {
    pub fn new(name: impl Into<String>, keyword: impl Into<String>, user_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            keyword: keyword.into(),
            vote_count: 0,
            ranking: UNRANKED,
            user_id,
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.ranking != UNRANKED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub amount: f64,
    pub ranking: u32,
    pub event_id: i64,
}

/// Filter for vote history lookups; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteQuery {
    pub user_id: Option<i64>,
    pub event_id: Option<i64>,
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub end: Option<DateTime<Utc>>,
}

impl VoteQuery {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_event(event_id: i64) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn matches(&self, vote: &Vote) -> bool {
        self.user_id.map_or(true, |id| vote.user_id == id)
            && self.event_id.map_or(true, |id| vote.event_id == id)
            && self.start.map_or(true, |start| vote.timestamp >= start)
            && self.end.map_or(true, |end| vote.timestamp <= end)
    }
}

/// Convert a stored unix-millisecond timestamp back to UTC
pub fn timestamp_from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
