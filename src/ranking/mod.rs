//! Ranking core - votes, slot purchases and final ordering
//!
//! # Architecture
//!
//! ```text
//! VoteRequest  → record_vote   → user budget ↓, event votes ↑, vote row
//! TradeRequest → buy_ranking   → evict outbid event, assign slot, trade row
//!                                   ↓
//! LedgerStore::find_all_events → RankingMerger → display order
//! ```
//!
//! `RsService` ties the three together over any `LedgerStore`. Writes for a
//! single vote or purchase always run inside `LedgerStore::atomically`.

pub mod merger;
pub mod service;
pub mod trade;
pub mod vote;

pub use merger::RankingMerger;
pub use service::RsService;
pub use trade::{buy_ranking, TradeRequest};
pub use vote::{record_vote, VoteRequest};
