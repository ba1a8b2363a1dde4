//! In-memory ledger backend
//!
//! Keeps every table in a `BTreeMap` behind a mutex. Atomic units snapshot the
//! tables up front and restore the snapshot when the unit fails.

use super::store::LedgerStore;
use super::types::{Event, Trade, User, Vote, VoteQuery};
use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    votes: BTreeMap<i64, Vote>,
    trades: BTreeMap<i64, Trade>,
    next_id: i64,
}

impl Tables {
    fn assign_id(&mut self, id: i64) -> i64 {
        if id != 0 {
            // keep generated ids clear of explicitly stored ones
            self.next_id = self.next_id.max(id);
            return id;
        }
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    tables: Mutex<Tables>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic mid-write cannot leave a half-applied row behind, so a
        // poisoned lock is still safe to reuse
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LedgerStore for InMemoryLedger {
    fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    fn find_event_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.tables().events.get(&id).cloned())
    }

    fn find_trade_by_slot(&self, ranking: u32) -> Result<Option<Trade>> {
        Ok(self
            .tables()
            .trades
            .values()
            .filter(|trade| trade.ranking == ranking)
            .max_by_key(|trade| trade.id)
            .cloned())
    }

    fn find_all_events(&self) -> Result<Vec<Event>> {
        Ok(self.tables().events.values().cloned().collect())
    }

    fn find_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>> {
        let mut votes: Vec<Vote> = self
            .tables()
            .votes
            .values()
            .filter(|vote| query.matches(vote))
            .cloned()
            .collect();
        votes.sort_by_key(|vote| (vote.timestamp, vote.id));
        Ok(votes)
    }

    fn save_user(&self, user: &User) -> Result<User> {
        let mut tables = self.tables();
        let mut stored = user.clone();
        stored.id = tables.assign_id(user.id);
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save_event(&self, event: &Event) -> Result<Event> {
        let mut tables = self.tables();
        let mut stored = event.clone();
        stored.id = tables.assign_id(event.id);
        tables.events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save_vote(&self, vote: &Vote) -> Result<Vote> {
        let mut tables = self.tables();
        let mut stored = vote.clone();
        stored.id = tables.assign_id(vote.id);
        tables.votes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save_trade(&self, trade: &Trade) -> Result<Trade> {
        let mut tables = self.tables();
        let mut stored = trade.clone();
        stored.id = tables.assign_id(trade.id);
        tables.trades.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn delete_event(&self, event: &Event) -> Result<()> {
        let mut tables = self.tables();
        tables.events.remove(&event.id);
        tables.votes.retain(|_, vote| vote.event_id != event.id);
        tables.trades.retain(|_, trade| trade.event_id != event.id);
        Ok(())
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let snapshot = self.tables().clone();

        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                *self.tables() = snapshot;
                log::debug!("Rolled back in-memory unit: {}", e);
                Err(e)
            }
        }
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use chrono::Utc;

    fn make_user(budget: i64) -> User {
        User {
            id: 0,
            name: "xiaoli".to_string(),
            gender: "female".to_string(),
            age: 19,
            email: "a@b.com".to_string(),
            phone: "18888888888".to_string(),
            vote_budget: budget,
        }
    }

    #[test]
    fn test_save_assigns_ids_and_updates_in_place() {
        let ledger = InMemoryLedger::new();

        let mut user = ledger.save_user(&make_user(5)).unwrap();
        assert_ne!(user.id, 0);

        user.vote_budget = 3;
        let updated = ledger.save_user(&user).unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap().vote_budget, 3);
    }

    #[test]
    fn test_delete_event_cascades() {
        let ledger = InMemoryLedger::new();
        let user = ledger.save_user(&make_user(5)).unwrap();
        let event = ledger.save_event(&Event::new("e", "k", user.id)).unwrap();

        ledger
            .save_vote(&Vote {
                id: 0,
                amount: 1,
                timestamp: Utc::now(),
                user_id: user.id,
                event_id: event.id,
            })
            .unwrap();
        ledger
            .save_trade(&Trade {
                id: 0,
                amount: 10.0,
                ranking: 1,
                event_id: event.id,
            })
            .unwrap();

        ledger.delete_event(&event).unwrap();

        assert!(ledger.find_event_by_id(event.id).unwrap().is_none());
        assert!(ledger.find_votes(&VoteQuery::default()).unwrap().is_empty());
        assert!(ledger.find_trade_by_slot(1).unwrap().is_none());
    }

    #[test]
    fn test_failed_unit_restores_snapshot() {
        let ledger = InMemoryLedger::new();
        let user = ledger.save_user(&make_user(5)).unwrap();

        let result: Result<()> = ledger.atomically(|store| {
            let mut changed = user.clone();
            changed.vote_budget = 0;
            store.save_user(&changed)?;
            Err(LedgerError::InvalidAmount)
        });

        assert!(matches!(result, Err(LedgerError::InvalidAmount)));
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap().vote_budget, 5);
    }
}
