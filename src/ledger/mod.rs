//! Ledger - persistence for users, events, votes and trades
//!
//! `LedgerStore` is the contract; `SqliteLedger` is the durable backend and
//! `InMemoryLedger` keeps everything in process.

pub mod memory;
pub mod sqlite;
pub mod store;
pub mod types;

pub use memory::InMemoryLedger;
pub use sqlite::{run_schema_migrations, SqliteLedger};
pub use store::LedgerStore;
pub use types::{Event, Trade, User, Vote, VoteQuery, UNRANKED};
