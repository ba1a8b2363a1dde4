//! Ranking slot purchases
//!
//! A slot belongs to the event of its latest trade, as long as that event
//! still exists and still holds the slot. A new bid must strictly beat the
//! current holder's amount; the outbid event is deleted from the list.

use crate::error::{LedgerError, Result};
use crate::ledger::{Event, LedgerStore, Trade};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub amount: f64,
    pub ranking: u32,
    pub event_id: i64,
}

/// Current holder of a slot
struct Occupant {
    trade: Trade,
    event: Event,
}

fn find_occupant<S: LedgerStore>(store: &S, ranking: u32) -> Result<Option<Occupant>> {
    let Some(trade) = store.find_trade_by_slot(ranking)? else {
        return Ok(None);
    };

    // Stale when the holder has since moved to another slot
    let occupant = store
        .find_event_by_id(trade.event_id)?
        .filter(|event| event.ranking == ranking)
        .map(|event| Occupant { trade, event });
    Ok(occupant)
}

/// Validate and record a slot purchase
///
/// Runs as one atomic unit: evicting the outbid event, saving the buyer's new
/// ranking and recording the trade either all happen or none do.
pub fn buy_ranking<S: LedgerStore>(store: &S, request: &TradeRequest) -> Result<Trade> {
    if request.ranking == 0 {
        return Err(LedgerError::InvalidRanking(request.ranking));
    }
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(LedgerError::InvalidAmount);
    }

    store.atomically(|store| {
        let mut event = store
            .find_event_by_id(request.event_id)?
            .ok_or_else(|| LedgerError::event_not_found(request.event_id))?;

        if let Some(occupant) = find_occupant(store, request.ranking)? {
            if request.amount <= occupant.trade.amount {
                return Err(LedgerError::InsufficientBid {
                    offered: request.amount,
                    current: occupant.trade.amount,
                });
            }

            if occupant.event.id != event.id {
                log::info!(
                    "Slot {} outbid: event {} ({}) evicts event {} ({})",
                    request.ranking,
                    event.id,
                    request.amount,
                    occupant.event.id,
                    occupant.trade.amount
                );
                store.delete_event(&occupant.event)?;
            }
        }

        event.ranking = request.ranking;
        store.save_event(&event)?;

        let trade = store.save_trade(&Trade {
            id: 0,
            amount: request.amount,
            ranking: request.ranking,
            event_id: event.id,
        })?;

        log::debug!(
            "Trade: event={} slot={} amount={}",
            event.id,
            trade.ranking,
            trade.amount
        );

        Ok(trade)
    })
}
