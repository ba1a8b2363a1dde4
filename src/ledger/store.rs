//! Ledger store trait
//!
//! Defines the persistence contract the ranking service runs against.

use super::types::{Event, Trade, User, Vote, VoteQuery};
use crate::error::Result;

/// Backend trait for users, events, votes and trades
///
/// Save operations insert when the record's `id` is 0 and update otherwise;
/// they return the stored record with its assigned id.
pub trait LedgerStore {
    fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    fn find_event_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Latest trade recorded for `ranking`, if any
    fn find_trade_by_slot(&self, ranking: u32) -> Result<Option<Trade>>;

    /// All events in insertion order
    fn find_all_events(&self) -> Result<Vec<Event>>;

    /// Votes matching `query`, ordered by timestamp
    fn find_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>>;

    fn save_user(&self, user: &User) -> Result<User>;

    fn save_event(&self, event: &Event) -> Result<Event>;

    fn save_vote(&self, vote: &Vote) -> Result<Vote>;

    fn save_trade(&self, trade: &Trade) -> Result<Trade>;

    /// Delete an event together with the votes and trades referencing it
    fn delete_event(&self, event: &Event) -> Result<()>;

    /// Run `f` as one all-or-nothing unit
    ///
    /// If `f` returns an error every write it made is rolled back and the
    /// error is returned unchanged. Units do not nest.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> Result<T>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
