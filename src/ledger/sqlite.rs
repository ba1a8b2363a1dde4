//! SQLite ledger backend
//!
//! Tables (see `/sql/` directory):
//! - `users` - UPSERT on id
//! - `events` - UPSERT on id, deleted on eviction
//! - `votes` - INSERT (append-only, cascades with its event)
//! - `trades` - INSERT (latest row per ranking is the slot's current trade)

use super::store::LedgerStore;
use super::types::{timestamp_from_millis, Event, Trade, User, Vote, VoteQuery};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Embedded schema files, applied in order. Every file uses IF NOT EXISTS.
const MIGRATIONS: &[(&str, &str)] = &[
    ("01_users.sql", include_str!("../../sql/01_users.sql")),
    ("02_events.sql", include_str!("../../sql/02_events.sql")),
    ("03_votes.sql", include_str!("../../sql/03_votes.sql")),
    ("04_trades.sql", include_str!("../../sql/04_trades.sql")),
];

/// Run schema migrations
///
/// Idempotent: safe to call on every startup.
pub fn run_schema_migrations(conn: &Connection) -> Result<()> {
    log::info!("🔧 Running {} schema migrations", MIGRATIONS.len());

    for (name, sql) in MIGRATIONS {
        log::debug!("   ├─ Executing: {}", name);
        conn.execute_batch(sql)?;
    }

    log::info!("✅ Schema up to date");
    Ok(())
}

pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (or create) the database at `db_path` and bring its schema up to date
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())?;

        // Enable WAL mode for file-backed databases
        conn.pragma_update(None, "journal_mode", "WAL")?;

        log::info!("📊 Opened SQLite ledger at {}", db_path.as_ref().display());
        Self::from_connection(conn)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Cascading deletes on eviction rely on this
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_schema_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        gender: row.get(2)?,
        age: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        vote_budget: row.get(6)?,
    })
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
        keyword: row.get(2)?,
        vote_count: row.get(3)?,
        ranking: row.get(4)?,
        user_id: row.get(5)?,
    })
}

fn vote_from_row(row: &Row<'_>) -> rusqlite::Result<Vote> {
    Ok(Vote {
        id: row.get(0)?,
        amount: row.get(1)?,
        timestamp: timestamp_from_millis(row.get(2)?),
        user_id: row.get(3)?,
        event_id: row.get(4)?,
    })
}

fn trade_from_row(row: &Row<'_>) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: row.get(0)?,
        amount: row.get(1)?,
        ranking: row.get(2)?,
        event_id: row.get(3)?,
    })
}

/// NULL id lets SQLite assign the next AUTOINCREMENT value
fn id_param(id: i64) -> Option<i64> {
    (id != 0).then_some(id)
}

impl SqliteLedger {
    fn stored_id(&self, id: i64) -> i64 {
        if id == 0 {
            self.conn.last_insert_rowid()
        } else {
            id
        }
    }
}

impl LedgerStore for SqliteLedger {
    fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, gender, age, email, phone, vote_budget FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_event_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = self
            .conn
            .query_row(
                "SELECT id, name, keyword, vote_count, ranking, user_id FROM events WHERE id = ?1",
                [id],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    fn find_trade_by_slot(&self, ranking: u32) -> Result<Option<Trade>> {
        let trade = self
            .conn
            .query_row(
                "SELECT id, amount, ranking, event_id FROM trades
                 WHERE ranking = ?1
                 ORDER BY id DESC
                 LIMIT 1",
                [ranking],
                trade_from_row,
            )
            .optional()?;
        Ok(trade)
    }

    fn find_all_events(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, keyword, vote_count, ranking, user_id FROM events ORDER BY id ASC",
        )?;
        let events = stmt
            .query_map([], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn find_votes(&self, query: &VoteQuery) -> Result<Vec<Vote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, timestamp, user_id, event_id FROM votes
             WHERE (?1 IS NULL OR user_id = ?1)
               AND (?2 IS NULL OR event_id = ?2)
               AND (?3 IS NULL OR timestamp >= ?3)
               AND (?4 IS NULL OR timestamp <= ?4)
             ORDER BY timestamp ASC, id ASC",
        )?;
        let votes = stmt
            .query_map(
                params![
                    query.user_id,
                    query.event_id,
                    query.start.map(|ts| ts.timestamp_millis()),
                    query.end.map(|ts| ts.timestamp_millis()),
                ],
                vote_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(votes)
    }

    fn save_user(&self, user: &User) -> Result<User> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, name, gender, age, email, phone, vote_budget)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                gender = excluded.gender,
                age = excluded.age,
                email = excluded.email,
                phone = excluded.phone,
                vote_budget = excluded.vote_budget
            "#,
            params![
                id_param(user.id),
                user.name,
                user.gender,
                user.age,
                user.email,
                user.phone,
                user.vote_budget,
            ],
        )?;

        let mut stored = user.clone();
        stored.id = self.stored_id(user.id);
        Ok(stored)
    }

    fn save_event(&self, event: &Event) -> Result<Event> {
        self.conn.execute(
            r#"
            INSERT INTO events (id, name, keyword, vote_count, ranking, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                keyword = excluded.keyword,
                vote_count = excluded.vote_count,
                ranking = excluded.ranking,
                user_id = excluded.user_id
            "#,
            params![
                id_param(event.id),
                event.name,
                event.keyword,
                event.vote_count,
                event.ranking,
                event.user_id,
            ],
        )?;

        let mut stored = event.clone();
        stored.id = self.stored_id(event.id);
        Ok(stored)
    }

    fn save_vote(&self, vote: &Vote) -> Result<Vote> {
        self.conn.execute(
            "INSERT INTO votes (id, amount, timestamp, user_id, event_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id_param(vote.id),
                vote.amount,
                vote.timestamp.timestamp_millis(),
                vote.user_id,
                vote.event_id,
            ],
        )?;

        let mut stored = vote.clone();
        stored.id = self.stored_id(vote.id);
        Ok(stored)
    }

    fn save_trade(&self, trade: &Trade) -> Result<Trade> {
        self.conn.execute(
            r#"
            INSERT INTO trades (id, amount, ranking, event_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                amount = excluded.amount,
                ranking = excluded.ranking,
                event_id = excluded.event_id
            "#,
            params![id_param(trade.id), trade.amount, trade.ranking, trade.event_id],
        )?;

        let mut stored = trade.clone();
        stored.id = self.stored_id(trade.id);
        Ok(stored)
    }

    fn delete_event(&self, event: &Event) -> Result<()> {
        // votes and trades go with it (ON DELETE CASCADE)
        self.conn.execute("DELETE FROM events WHERE id = ?1", [event.id])?;
        Ok(())
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;

        match f(self) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                // Dropping the transaction rolls it back
                drop(tx);
                log::debug!("Rolled back SQLite transaction: {}", e);
                Err(e)
            }
        }
    }

    fn backend_type(&self) -> &'static str {
        "sqlite"
    }
}
