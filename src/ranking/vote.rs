//! Vote processing: spend a user's budget on an event

use crate::error::{LedgerError, Result};
use crate::ledger::{LedgerStore, Vote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub amount: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

/// Validate and record a vote
///
/// The vote row, the user's reduced budget and the event's raised count are
/// written in one atomic unit. Any rejection leaves the store untouched.
pub fn record_vote<S: LedgerStore>(store: &S, request: &VoteRequest) -> Result<Vote> {
    if request.amount <= 0 {
        return Err(LedgerError::InvalidAmount);
    }

    store.atomically(|store| {
        let mut event = store
            .find_event_by_id(request.event_id)?
            .ok_or_else(|| LedgerError::event_not_found(request.event_id))?;
        let mut user = store
            .find_user_by_id(request.user_id)?
            .ok_or_else(|| LedgerError::user_not_found(request.user_id))?;

        if request.amount > user.vote_budget {
            return Err(LedgerError::InsufficientBudget {
                requested: request.amount,
                remaining: user.vote_budget,
            });
        }

        let vote_count = event
            .vote_count
            .checked_add(request.amount)
            .ok_or(LedgerError::Overflow { field: "vote_count" })?;

        let vote = store.save_vote(&Vote {
            id: 0,
            amount: request.amount,
            timestamp: request.timestamp,
            user_id: user.id,
            event_id: event.id,
        })?;

        user.vote_budget -= request.amount;
        store.save_user(&user)?;

        event.vote_count = vote_count;
        store.save_event(&event)?;

        log::debug!(
            "Vote: user={} event={} amount={} budget_left={} event_votes={}",
            user.id,
            event.id,
            request.amount,
            user.vote_budget,
            event.vote_count
        );

        Ok(vote)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Event, InMemoryLedger, User, VoteQuery};

    fn setup(budget: i64) -> (InMemoryLedger, User, Event) {
        let ledger = InMemoryLedger::new();
        let user = ledger
            .save_user(&User {
                id: 0,
                name: "xiaoli".to_string(),
                gender: "female".to_string(),
                age: 19,
                email: "a@b.com".to_string(),
                phone: "18888888888".to_string(),
                vote_budget: budget,
            })
            .unwrap();
        let mut event = Event::new("event name", "keyword", user.id);
        event.vote_count = 2;
        let event = ledger.save_event(&event).unwrap();
        (ledger, user, event)
    }

    fn request(amount: i64, user: &User, event: &Event) -> VoteRequest {
        VoteRequest {
            amount,
            event_id: event.id,
            user_id: user.id,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_vote_success() {
        let (ledger, user, event) = setup(5);
        let req = request(2, &user, &event);

        let vote = record_vote(&ledger, &req).unwrap();

        assert_eq!(vote.amount, 2);
        assert_eq!(vote.timestamp, req.timestamp);
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap().vote_budget, 3);
        assert_eq!(ledger.find_event_by_id(event.id).unwrap().unwrap().vote_count, 4);
        assert_eq!(ledger.find_votes(&VoteQuery::for_user(user.id)).unwrap(), vec![vote]);
    }

    #[test]
    fn test_vote_whole_budget() {
        let (ledger, user, event) = setup(5);

        record_vote(&ledger, &request(5, &user, &event)).unwrap();

        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap().vote_budget, 0);
    }

    #[test]
    fn test_vote_over_budget_leaves_state_unchanged() {
        let (ledger, user, event) = setup(5);

        let err = record_vote(&ledger, &request(6, &user, &event)).unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InsufficientBudget { requested: 6, remaining: 5 }
        ));
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap(), user);
        assert_eq!(ledger.find_event_by_id(event.id).unwrap().unwrap(), event);
        assert!(ledger.find_votes(&VoteQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_vote_missing_user_or_event() {
        let (ledger, user, event) = setup(5);

        let mut missing_user = request(1, &user, &event);
        missing_user.user_id = 999;
        assert!(matches!(
            record_vote(&ledger, &missing_user),
            Err(LedgerError::NotFound { entity: "user", id: 999 })
        ));

        let mut missing_event = request(1, &user, &event);
        missing_event.event_id = 998;
        assert!(matches!(
            record_vote(&ledger, &missing_event),
            Err(LedgerError::NotFound { entity: "event", id: 998 })
        ));
    }

    #[test]
    fn test_vote_count_overflow_rejected_before_any_write() {
        let (ledger, user, event) = setup(5);
        let mut full = ledger.find_event_by_id(event.id).unwrap().unwrap();
        full.vote_count = i64::MAX;
        let full = ledger.save_event(&full).unwrap();

        let err = record_vote(&ledger, &request(1, &user, &full)).unwrap_err();

        assert!(matches!(err, LedgerError::Overflow { field: "vote_count" }));
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap(), user);
        assert_eq!(ledger.find_event_by_id(event.id).unwrap().unwrap(), full);
        assert!(ledger.find_votes(&VoteQuery::default()).unwrap().is_empty());

        // the store is still usable afterwards
        let other = ledger.save_event(&Event::new("other", "k", user.id)).unwrap();
        record_vote(&ledger, &request(1, &user, &other)).unwrap();
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap().vote_budget, 4);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let (ledger, user, event) = setup(5);

        for amount in [0, -3] {
            assert!(matches!(
                record_vote(&ledger, &request(amount, &user, &event)),
                Err(LedgerError::InvalidAmount)
            ));
        }
        assert_eq!(ledger.find_user_by_id(user.id).unwrap().unwrap().vote_budget, 5);
    }
}
