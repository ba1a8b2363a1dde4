pub mod config;
pub mod error;
pub mod ledger;
pub mod ranking;

pub use config::Config;
pub use error::{LedgerError, Result};
pub use ledger::{Event, InMemoryLedger, LedgerStore, SqliteLedger, Trade, User, Vote, VoteQuery};
pub use ranking::{RsService, TradeRequest, VoteRequest};
