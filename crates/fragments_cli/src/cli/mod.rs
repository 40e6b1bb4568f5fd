use clap::{Parser, Subcommand};
use fragments_core::config::ConfigOverrides;
use fragments_core::stats::MAX_CHART_DAYS;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Earn fragments by finishing tasks, spend them on rewards", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage tasks
    Task {
        #[command(subcommand)]
        task: TaskCommand,
    },
    /// Manage rewards and spend fragments
    Reward {
        #[command(subcommand)]
        reward: RewardCommand,
    },
    /// Show statistics
    Stats {
        #[command(subcommand)]
        stats: StatsCommand,
    },
    /// Dice counters
    Dice {
        #[command(subcommand)]
        dice: DiceCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a new task
    ///
    /// Example: fragments task add "Read for 30 minutes"
    Add { name: Option<String> },
    /// Rename a task
    ///
    /// Example: fragments task rename 7 "Read for 45 minutes"
    Rename { id: u64, name: String },
    /// Roll the dice: pick a random pending task to work on
    ///
    /// Example: fragments task roll
    Roll,
    /// Mark a task as completed and earn a fragment
    ///
    /// Example: fragments task done 7
    Done { id: u64 },
    /// Delete a task
    ///
    /// Example: fragments task delete 7
    Delete { id: u64 },
    /// List all tasks
    ///
    /// Example: fragments task list
    List,
    /// Show the task currently in progress
    ///
    /// Example: fragments task current
    Current,
}

#[derive(Subcommand, Debug)]
pub enum RewardCommand {
    /// Add a reward with its fragment cost
    ///
    /// Example: fragments reward add "Movie night" 5
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        cost: i64,
    },
    /// Spend fragments on a reward
    ///
    /// Example: fragments reward redeem 4
    Redeem { id: u64 },
    /// Delete a reward
    ///
    /// Example: fragments reward delete 4
    Delete { id: u64 },
    /// List rewards and the current balance
    ///
    /// Example: fragments reward list
    List,
    /// List past redemptions, newest first
    ///
    /// Example: fragments reward history
    History,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Totals: completed tasks, fragments earned, rewards redeemed
    Summary,
    /// Completions and redemptions, newest first
    Feed,
    /// Most recently completed tasks
    ///
    /// Example: fragments stats recent --limit 3
    Recent {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Activity per day over the trailing days
    ///
    /// Example: fragments stats chart --days 14
    Chart {
        #[arg(long, value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_CHART_DAYS)))]
        days: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DiceCommand {
    /// Reset today's roll counter
    ResetToday,
}

/// Parse a raw `KEY=VALUE` override string and fold it into `overrides`.
pub fn apply_config_override(overrides: &mut ConfigOverrides, raw: &str) -> Result<(), String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    match field.as_str() {
        "store_path" | "store" => {
            if value.is_empty() {
                return Err("store_path override cannot be empty".to_string());
            }
            overrides.store_path = Some(PathBuf::from(value));
        }
        "recent_limit" => {
            let limit = value
                .parse()
                .map_err(|_| format!("recent_limit must be a number, got '{value}'"))?;
            overrides.recent_limit = Some(limit);
        }
        "chart_days" => {
            let days: u32 = value
                .parse()
                .map_err(|_| format!("chart_days must be a number, got '{value}'"))?;
            if days > MAX_CHART_DAYS {
                return Err(format!("chart_days must be at most {MAX_CHART_DAYS}, got {days}"));
            }
            overrides.chart_days = Some(days);
        }
        "log_filter" | "log" => {
            overrides.log_filter = Some(value.to_string());
        }
        other => return Err(format!("unknown config field '{other}'")),
    }

    Ok(())
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
