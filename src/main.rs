use dotenv::dotenv;
use itertools::Itertools;

use std::env;

use leetboard::*;

use anyhow::{anyhow, Context, Result};

use config::Config;
use db::Store;
use lcapi::LeetCodeClient;
use service::{App, LEADERBOARD_LIMIT};

#[tokio::main]
async fn main() -> Result<()> {
    // Begin logger
    env_logger::init();

    dotenv().ok();
    let config = Config::from_env()?;

    // Initialize database
    let store = Store::open(config.database_path.clone());
    store.initialize().context("Could not initialize the database.")?;

    let provider = LeetCodeClient::new(&config)?;
    let app = App::new(config, store, provider);

    let args = env::args().skip(1).collect::<Vec<_>>();
    let (command, parameters) = match args.split_first() {
        Some((command, parameters)) => (command.as_str(), parameters),
        None => {
            print!("{}", help());
            return Ok(());
        }
    };

    match command {
        "audit" => {
            let handle = parameters
                .first()
                .context("Expected a LeetCode username to audit, got none.")?;

            let stats = app.verify_leetcode(handle).await?;
            println!("{stats}");
        }
        "leaderboard" => {
            let rows = app.leaderboard(LEADERBOARD_LIMIT)?;
            if rows.is_empty() {
                println!("No accounts registered yet.");
                return Ok(());
            }

            let table = rows
                .iter()
                .map(|row| {
                    format!(
                        "{:>4}  {:<20}  lvl {:<3}  {:>6} pts  {:>4} solved",
                        row.rank, row.username, row.level, row.score, row.problems
                    )
                })
                .join("\n");
            println!("{table}");
        }
        "sync" => {
            let id = parse_account_id(parameters)?;
            let synced = app.sync_leetcode(id).await?;
            println!(
                "{} {} is now level {} with {} points.",
                synced.message, synced.user.username, synced.user.level, synced.user.score
            );
        }
        "refresh" => {
            let id = parse_account_id(parameters)?;
            let refreshed = app.refresh_stats(id).await?;
            println!(
                "{} {} is now level {} with {} points.",
                refreshed.message, refreshed.user.username, refreshed.user.level,
                refreshed.user.score
            );
        }
        "rank" => {
            let id = parse_account_id(parameters)?;
            println!("Account {id} is ranked #{}.", app.rank_of(id)?);
        }
        "help" => {
            print!("{}", help());
        }
        _ => {
            return Err(anyhow!("No such command: {command}, see 'help' for commands."));
        }
    }

    Ok(())
}

fn parse_account_id(parameters: &[String]) -> Result<i64> {
    parameters
        .first()
        .context("Expected an account id, got none.")?
        .parse()
        .context("Account id must be an integer.")
}

/// Gets a help string. Should be updated after a new command is added.
fn help() -> String {
    String::from(
        "\
Command List:
  audit <leetcode username>:  Fetch live stats for an unclaimed LeetCode user
  leaderboard:                Print the ranked leaderboard
  sync <account id>:          Lightweight stats sync for one account
  refresh <account id>:       Full difficulty-weighted stats refresh for one account
  rank <account id>:          Print one account's current rank
  help:                       Get information on supported commands
",
    )
}
