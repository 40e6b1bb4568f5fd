use clap::{CommandFactory, Parser};
use fragments_cli::cli::{
    Cli, Command, DiceCommand, RewardCommand, StatsCommand, TaskCommand, apply_config_override,
};
use fragments_cli::render;
use fragments_core::DomainStore;
use fragments_core::config::{self, Config, ConfigOverrides};
use fragments_core::error::AppError;
use fragments_core::storage::{JsonStore, json_store};
use std::io::{self, BufRead};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_ENV_VAR: &str = "FRAGMENTS_LOG";

fn init_tracing(config: &Config) {
    // Opt-in; stdout stays reserved for command output.
    let filter = [std::env::var(LOG_ENV_VAR).ok(), std::env::var("RUST_LOG").ok()]
        .into_iter()
        .flatten()
        .chain(config.log_filter.clone())
        .map(|raw| raw.trim().to_string())
        .find(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn effective_config(base: &Config, raw_overrides: &[String]) -> Result<Config, AppError> {
    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        apply_config_override(&mut overrides, raw).map_err(AppError::validation)?;
    }
    Ok(config::merge_overrides(base, &overrides))
}

fn open_store(config: &Config) -> Result<DomainStore<JsonStore>, AppError> {
    let path = json_store::store_path(config.store_path.as_deref())?;
    tracing::debug!(path = %path.display(), "opening store");
    DomainStore::open(JsonStore::new(path))
}

fn run_command(cli: Cli, base: &Config) -> Result<(), AppError> {
    let config = effective_config(base, &cli.config_override)?;
    let mut store = open_store(&config)?;
    let json = cli.json;

    match cli.command {
        Command::Task { task } => match task {
            TaskCommand::Add { name } => {
                let name = match name {
                    Some(value) if !value.trim().is_empty() => value,
                    _ => return Err(AppError::validation("name is required")),
                };
                let task = store.add_task(&name)?;
                render::task_result("Added task", &task, json)?;
            }
            TaskCommand::Rename { id, name } => {
                let task = store.rename_task(id, &name)?;
                render::task_result("Renamed task", &task, json)?;
            }
            TaskCommand::Roll => {
                let task = store.select_random_pending_task()?;
                render::task_result("Rolled task", &task, json)?;
            }
            TaskCommand::Done { id } => {
                let task = store.complete_task(id)?;
                if json {
                    render::task_result("Completed task", &task, json)?;
                } else {
                    println!(
                        "Completed task: {} ({}) +1 fragment, balance {}",
                        task.name,
                        task.id,
                        store.ledger().total_fragments
                    );
                }
            }
            TaskCommand::Delete { id } => {
                let task = store.delete_task(id)?;
                render::task_result("Deleted task", &task, json)?;
            }
            TaskCommand::List => render::tasks(store.tasks(), json)?,
            TaskCommand::Current => match store.current_task() {
                Some(task) => render::task_result("Current task", task, json)?,
                None if json => println!("null"),
                None => println!("No task in progress"),
            },
        },
        Command::Reward { reward } => match reward {
            RewardCommand::Add { name, cost } => {
                let reward = store.add_reward(&name, cost)?;
                render::reward_result("Added reward", &reward, json)?;
            }
            RewardCommand::Redeem { id } => {
                let record = store.redeem_reward(id)?;
                render::redeemed(&record, store.ledger().total_fragments, json)?;
            }
            RewardCommand::Delete { id } => {
                let reward = store.delete_reward(id)?;
                render::reward_result("Deleted reward", &reward, json)?;
            }
            RewardCommand::List => render::rewards(store.ledger(), json)?,
            RewardCommand::History => render::history(&store.ledger().exchange_history, json)?,
        },
        Command::Stats { stats } => match stats {
            StatsCommand::Summary => render::summary(&store.stats_summary(), json)?,
            StatsCommand::Feed => render::feed(&store.learning_feed(), json)?,
            StatsCommand::Recent { limit } => {
                let limit = limit.unwrap_or_else(|| config.recent_limit());
                render::tasks(&store.recent_completed_tasks(limit), json)?;
            }
            StatsCommand::Chart { days } => {
                let days = days.unwrap_or_else(|| config.chart_days());
                render::chart(&store.daily_activity_histogram(days), json)?;
            }
        },
        Command::Dice { dice } => match dice {
            DiceCommand::ResetToday => {
                let stats = store.reset_today_rolls()?;
                if json {
                    render::json(&stats)?;
                } else {
                    println!("Today's rolls reset (lifetime rolls: {})", stats.used_rolls);
                }
            }
        },
    }

    Ok(())
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("fragments".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, config) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: config ignored: {}", err);
    }
    let config = loaded.config;
    init_tracing(&config);

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&config) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &config) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
