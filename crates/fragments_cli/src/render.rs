//! Plain and JSON output for every command.

use fragments_core::error::AppError;
use fragments_core::model::{ExchangeRecord, Reward, RewardsLedger, Task};
use fragments_core::stats::{DailyCount, FeedEntry, StatsSummary};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Completed")]
    completed: String,
}

#[derive(Tabled)]
struct RewardRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Reward")]
    name: String,
    #[tabled(rename = "Cost")]
    cost: u32,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Reward")]
    name: String,
    #[tabled(rename = "Cost")]
    cost: u32,
}

#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "")]
    bar: String,
}

pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

pub fn stamp(at: OffsetDateTime) -> Result<String, AppError> {
    at.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn chart_label(date: Date) -> Result<String, AppError> {
    date.format(format_description!("[month]/[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

pub fn task_result(action: &str, task: &Task, as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(task);
    }
    println!("{action}: {} ({})", task.name, task.id);
    Ok(())
}

pub fn tasks(tasks: &[Task], as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(tasks);
    }
    if tasks.is_empty() {
        println!("No tasks");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        rows.push(TaskRow {
            id: task.id,
            name: task.name.clone(),
            status: task.status.label(),
            created: stamp(task.create_time)?,
            completed: match task.completed_at {
                Some(at) => stamp(at)?,
                None => "-".to_string(),
            },
        });
    }
    print_table(rows);
    Ok(())
}

pub fn reward_result(action: &str, reward: &Reward, as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(reward);
    }
    println!(
        "{action}: {} ({}) costs {} fragments",
        reward.name, reward.id, reward.cost
    );
    Ok(())
}

pub fn redeemed(record: &ExchangeRecord, balance: u32, as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(record);
    }
    println!(
        "Redeemed reward: {} for {} fragments, balance {}",
        record.reward_name, record.cost, balance
    );
    Ok(())
}

pub fn rewards(ledger: &RewardsLedger, as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(&serde_json::json!({
            "balance": ledger.total_fragments,
            "rewards": ledger.reward_list,
        }));
    }

    println!("Fragments: {}", ledger.total_fragments);
    if ledger.reward_list.is_empty() {
        println!("No rewards");
        return Ok(());
    }
    let rows = ledger
        .reward_list
        .iter()
        .map(|reward| RewardRow {
            id: reward.id,
            name: reward.name.clone(),
            cost: reward.cost,
        })
        .collect();
    print_table::<RewardRow>(rows);
    Ok(())
}

pub fn history(records: &[ExchangeRecord], as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(records);
    }
    if records.is_empty() {
        println!("No redemptions yet");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        rows.push(HistoryRow {
            date: stamp(record.date)?,
            name: record.reward_name.clone(),
            cost: record.cost,
        });
    }
    print_table(rows);
    Ok(())
}

pub fn summary(summary: &StatsSummary, as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(summary);
    }
    println!("Completed tasks:   {}", summary.completed_tasks);
    println!("Fragments earned:  {}", summary.total_earned);
    println!("Fragments on hand: {}", summary.balance);
    println!("Rewards redeemed:  {}", summary.exchanged_rewards);
    println!(
        "Dice rolls:        {} ({} today)",
        summary.used_rolls, summary.today_rolls
    );
    Ok(())
}

pub fn feed(entries: &[FeedEntry], as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(entries);
    }
    if entries.is_empty() {
        println!("Nothing recorded yet");
        return Ok(());
    }
    for entry in entries {
        println!("{} {}  {}", stamp(entry.timestamp)?, entry.icon, entry.text);
    }
    Ok(())
}

pub fn chart(days: &[DailyCount], as_json: bool) -> Result<(), AppError> {
    if as_json {
        return json(days);
    }

    let mut rows = Vec::with_capacity(days.len());
    for day in days {
        rows.push(ChartRow {
            day: chart_label(day.date)?,
            count: day.count,
            bar: "#".repeat(day.count),
        });
    }
    print_table(rows);
    Ok(())
}
