//! rslist - ranking list command line
//!
//! ## Usage
//!
//! ```bash
//! rslist add-user <name> <gender> <age> <email> <phone> [vote_budget]
//! rslist add-event <user_id> <name> <keyword>
//! rslist vote <user_id> <event_id> <amount>
//! rslist buy <event_id> <ranking> <amount>
//! rslist list
//! rslist votes [--user <id>] [--event <id>] [--from <rfc3339>] [--to <rfc3339>]
//! ```
//!
//! Results are printed to stdout as JSON, logs go to stderr.
//!
//! ## Environment Variables
//!
//! - RSLIST_DB_PATH - SQLite database path (default: data/rslist.db)
//! - RSLIST_DEFAULT_VOTE_BUDGET - Budget for new users when not given (default: 10)
//! - RUST_LOG - Logging level (optional, default: info)

use chrono::{DateTime, Utc};
use rslist::{Config, RsService, SqliteLedger, TradeRequest, User, VoteQuery, VoteRequest};
use serde::Serialize;
use std::env;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

const USAGE: &str = "usage: rslist <add-user|add-event|vote|buy|list|votes> [args...]";

fn arg<T>(args: &[String], index: usize, name: &str) -> Result<T, Box<dyn Error>>
where
    T: FromStr,
    T::Err: Error + 'static,
{
    let raw = args
        .get(index)
        .ok_or_else(|| format!("missing <{}>\n{}", name, USAGE))?;
    raw.parse::<T>()
        .map_err(|e| format!("invalid <{}> '{}': {}", name, raw, e).into())
}

fn flag(args: &[String], name: &str) -> Result<Option<i64>, Box<dyn Error>> {
    match args.iter().position(|a| a == name) {
        Some(idx) => Ok(Some(arg(args, idx + 1, name)?)),
        None => Ok(None),
    }
}

/// Optional `--from`/`--to` bound in RFC 3339, e.g. 2024-05-01T08:00:00Z
fn time_flag(args: &[String], name: &str) -> Result<Option<DateTime<Utc>>, Box<dyn Error>> {
    match args.iter().position(|a| a == name) {
        Some(idx) => {
            let raw = args
                .get(idx + 1)
                .ok_or_else(|| format!("missing value for {}", name))?;
            let ts = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| format!("invalid {} '{}': {}", name, raw, e))?;
            Ok(Some(ts.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(config: &Config, args: &[String]) -> Result<(), Box<dyn Error>> {
    let command = args.first().ok_or(USAGE)?;

    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let service = RsService::new(SqliteLedger::open(&config.db_path)?);

    match command.as_str() {
        "add-user" => {
            let vote_budget = if args.len() > 6 {
                arg(args, 6, "vote_budget")?
            } else {
                config.default_vote_budget
            };
            let user = service.register_user(&User {
                id: 0,
                name: arg(args, 1, "name")?,
                gender: arg(args, 2, "gender")?,
                age: arg(args, 3, "age")?,
                email: arg(args, 4, "email")?,
                phone: arg(args, 5, "phone")?,
                vote_budget,
            })?;
            print_json(&user)
        }
        "add-event" => {
            let user_id: i64 = arg(args, 1, "user_id")?;
            let name: String = arg(args, 2, "name")?;
            let keyword: String = arg(args, 3, "keyword")?;
            print_json(&service.add_event(user_id, &name, &keyword)?)
        }
        "vote" => {
            let vote = service.vote(&VoteRequest {
                user_id: arg(args, 1, "user_id")?,
                event_id: arg(args, 2, "event_id")?,
                amount: arg(args, 3, "amount")?,
                timestamp: Utc::now(),
            })?;
            print_json(&vote)
        }
        "buy" => {
            let trade = service.buy(&TradeRequest {
                event_id: arg(args, 1, "event_id")?,
                ranking: arg(args, 2, "ranking")?,
                amount: arg(args, 3, "amount")?,
            })?;
            print_json(&trade)
        }
        "list" => print_json(&service.ranked_events()?),
        "votes" => {
            let query = VoteQuery {
                user_id: flag(args, "--user")?,
                event_id: flag(args, "--event")?,
                start: time_flag(args, "--from")?,
                end: time_flag(args, "--to")?,
            };
            print_json(&service.votes(&query)?)
        }
        other => Err(format!("unknown command '{}'\n{}", other, USAGE).into()),
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_default_env()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    };
    builder.target(env_logger::Target::Stderr).init();

    log::debug!("Database: {}", config.db_path);

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
