use super::merger::RankingMerger;
use super::trade::{buy_ranking, TradeRequest};
use super::vote::{record_vote, VoteRequest};
use crate::error::{LedgerError, Result};
use crate::ledger::{Event, LedgerStore, Trade, User, Vote, VoteQuery};

/// Ranking list operations over a ledger store
pub struct RsService<S: LedgerStore> {
    store: S,
    merger: RankingMerger,
}

impl<S: LedgerStore> RsService<S> {
    pub fn new(store: S) -> Self {
        log::info!("RsService ready ({} backend)", store.backend_type());
        Self {
            store,
            merger: RankingMerger::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a new user; any id on the input is ignored
    pub fn register_user(&self, user: &User) -> Result<User> {
        let user = self.store.save_user(&User { id: 0, ..user.clone() })?;
        log::info!("Registered user {} ({})", user.id, user.name);
        Ok(user)
    }

    /// Submit a new unranked event on behalf of `user_id`
    pub fn add_event(&self, user_id: i64, name: &str, keyword: &str) -> Result<Event> {
        if self.store.find_user_by_id(user_id)?.is_none() {
            return Err(LedgerError::user_not_found(user_id));
        }
        let event = self.store.save_event(&Event::new(name, keyword, user_id))?;
        log::info!("Added event {} ({}) for user {}", event.id, event.name, user_id);
        Ok(event)
    }

    pub fn vote(&self, request: &VoteRequest) -> Result<Vote> {
        record_vote(&self.store, request).map_err(|e| {
            if e.is_rejection() {
                log::warn!("Vote rejected: {}", e);
            }
            e
        })
    }

    pub fn buy(&self, request: &TradeRequest) -> Result<Trade> {
        buy_ranking(&self.store, request).map_err(|e| {
            if e.is_rejection() {
                log::warn!("Trade rejected: {}", e);
            }
            e
        })
    }

    /// All events in display order
    pub fn ranked_events(&self) -> Result<Vec<Event>> {
        let events = self.store.find_all_events()?;
        Ok(self.merger.merge(events))
    }

    pub fn votes(&self, query: &VoteQuery) -> Result<Vec<Vote>> {
        self.store.find_votes(query)
    }
}
