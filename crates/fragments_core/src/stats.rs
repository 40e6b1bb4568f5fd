//! Read-only views derived from a [`UserData`] snapshot.

use crate::model::{Task, UserData};
use serde::Serialize;
use time::{Date, OffsetDateTime};

pub const TASK_ICON: &str = "✅";
pub const REWARD_ICON: &str = "🎁";

/// Longest window [`daily_activity_histogram`] will build.
pub const MAX_CHART_DAYS: u32 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Task,
    Reward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub kind: FeedKind,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: Date,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub completed_tasks: usize,
    pub total_earned: u32,
    pub balance: u32,
    pub exchanged_rewards: usize,
    pub used_rolls: u32,
    pub today_rolls: u32,
}

pub fn completed_task_count(data: &UserData) -> usize {
    data.tasks.iter().filter(|task| task.is_completed()).count()
}

/// Everything ever earned: what is still spendable plus what was spent.
pub fn total_earned_fragments(data: &UserData) -> u32 {
    data.rewards
        .total_fragments
        .saturating_add(data.rewards.used_fragments)
}

pub fn exchanged_reward_count(data: &UserData) -> usize {
    data.rewards.exchange_history.len()
}

pub fn summary(data: &UserData) -> StatsSummary {
    StatsSummary {
        completed_tasks: completed_task_count(data),
        total_earned: total_earned_fragments(data),
        balance: data.rewards.total_fragments,
        exchanged_rewards: exchanged_reward_count(data),
        used_rolls: data.dice_stats.used_rolls,
        today_rolls: data.dice_stats.today_rolls,
    }
}

/// Task completions and redemptions, newest first. Equal timestamps keep
/// their input order: tasks before exchanges, each in stored order.
pub fn learning_feed(data: &UserData) -> Vec<FeedEntry> {
    let completions = data.tasks.iter().filter_map(|task| {
        task.completed_at.map(|completed_at| FeedEntry {
            kind: FeedKind::Task,
            text: format!("Completed task: {}", task.name),
            timestamp: completed_at,
            icon: TASK_ICON,
        })
    });
    let exchanges = data
        .rewards
        .exchange_history
        .iter()
        .map(|record| FeedEntry {
            kind: FeedKind::Reward,
            text: format!(
                "Redeemed reward: {} ({} fragments)",
                record.reward_name, record.cost
            ),
            timestamp: record.date,
            icon: REWARD_ICON,
        });

    let mut feed: Vec<FeedEntry> = completions.chain(exchanges).collect();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed
}

pub fn recent_completed_tasks(data: &UserData, limit: usize) -> Vec<Task> {
    let mut completed: Vec<&Task> = data
        .tasks
        .iter()
        .filter(|task| task.is_completed() && task.completed_at.is_some())
        .collect();
    completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    completed.into_iter().take(limit).cloned().collect()
}

/// Feed entries per calendar day for the `days` days ending on `now`'s date,
/// oldest first. Entries are bucketed in `now`'s UTC offset. `days` is capped
/// at [`MAX_CHART_DAYS`].
pub fn daily_activity_histogram(data: &UserData, now: OffsetDateTime, days: u32) -> Vec<DailyCount> {
    let days = days.min(MAX_CHART_DAYS);
    let offset = now.offset();
    let today = now.date();

    let mut buckets: Vec<DailyCount> = Vec::with_capacity(days as usize);
    let mut date = today;
    for _ in 0..days {
        buckets.push(DailyCount { date, count: 0 });
        match date.previous_day() {
            Some(previous) => date = previous,
            None => break,
        }
    }
    buckets.reverse();

    let Some(first) = buckets.first().map(|bucket| bucket.date) else {
        return buckets;
    };

    for entry in learning_feed(data) {
        let day = entry.timestamp.to_offset(offset).date();
        if day < first || day > today {
            continue;
        }
        let index = (day - first).whole_days() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.count += 1;
        }
    }

    buckets
}
