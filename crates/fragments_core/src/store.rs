use crate::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::model::{DiceStats, ExchangeRecord, Reward, RewardsLedger, Task, TaskStatus, UserData};
use crate::seed::default_user_data;
use crate::selector::choose_pending;
use crate::stats::{self, DailyCount, FeedEntry, StatsSummary};
use crate::storage::Persistence;
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Owns the user's aggregate and is the only way to change it.
///
/// Every mutation runs against a working copy, is flushed through the
/// [`Persistence`] gateway, and only then replaces the live state. A failed
/// operation, including a failed flush, leaves the store exactly as it was.
pub struct DomainStore<P: Persistence> {
    gateway: P,
    clock: Box<dyn Clock>,
    rng: StdRng,
    data: UserData,
}

impl<P: Persistence> DomainStore<P> {
    pub fn open(gateway: P) -> Result<Self, AppError> {
        Self::open_with(gateway, Box::new(SystemClock), StdRng::from_os_rng())
    }

    /// Loads the stored snapshot, or seeds and immediately persists the
    /// first-run dataset when there is none.
    pub fn open_with(mut gateway: P, clock: Box<dyn Clock>, rng: StdRng) -> Result<Self, AppError> {
        let data = match gateway.load()? {
            Some(mut data) => {
                data.check_invariants()?;
                data.reconcile_next_id();
                debug!(tasks = data.tasks.len(), "opened existing user data");
                data
            }
            None => {
                let data = default_user_data(clock.now());
                gateway.save(&data)?;
                info!("seeded default user data");
                data
            }
        };

        Ok(Self {
            gateway,
            clock,
            rng,
            data,
        })
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn gateway(&self) -> &P {
        &self.gateway
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn task(&self, id: u64) -> Result<&Task, AppError> {
        self.data.find_task(id).ok_or_else(|| task_not_found(id))
    }

    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.data.tasks.iter().filter(|task| task.is_pending()).collect()
    }

    /// The task currently rolled, derived from task states.
    pub fn current_task(&self) -> Option<&Task> {
        self.data
            .tasks
            .iter()
            .find(|task| task.status == TaskStatus::InProgress)
    }

    pub fn ledger(&self) -> &RewardsLedger {
        &self.data.rewards
    }

    pub fn dice_stats(&self) -> DiceStats {
        self.data.dice_stats
    }

    pub fn add_task(&mut self, name: &str) -> Result<Task, AppError> {
        let name = required_name(name)?;
        let task = self.commit(|data, now, _| {
            let task = Task {
                id: data.allocate_id(),
                name,
                status: TaskStatus::Pending,
                create_time: now,
                completed_at: None,
            };
            data.tasks.push(task.clone());
            Ok(task)
        })?;

        info!(task_id = task.id, "task added");
        Ok(task)
    }

    pub fn rename_task(&mut self, id: u64, name: &str) -> Result<Task, AppError> {
        let name = required_name(name)?;
        let task = self.commit(|data, _, _| {
            let task = find_task_mut(data, id)?;
            task.name = name;
            Ok(task.clone())
        })?;

        info!(task_id = id, "task renamed");
        Ok(task)
    }

    /// Rolls the dice: moves one uniformly chosen pending task to
    /// in-progress. The current task is never a candidate; it goes back to
    /// pending once another task is chosen, so at most one task is ever in
    /// progress.
    pub fn select_random_pending_task(&mut self) -> Result<Task, AppError> {
        let task = self.commit(|data, _, rng| {
            let index = choose_pending(&data.tasks, rng)?;
            for task in &mut data.tasks {
                if task.status == TaskStatus::InProgress {
                    task.status = TaskStatus::Pending;
                }
            }

            let stats = &mut data.dice_stats;
            stats.today_rolls = stats.today_rolls.saturating_add(1);
            stats.used_rolls = stats.used_rolls.saturating_add(1);

            let task = &mut data.tasks[index];
            task.status = TaskStatus::InProgress;
            Ok(task.clone())
        })?;

        info!(task_id = task.id, "task rolled");
        Ok(task)
    }

    /// Completes a pending or in-progress task and awards one fragment.
    pub fn complete_task(&mut self, id: u64) -> Result<Task, AppError> {
        let task = self.commit(|data, now, _| {
            let existing = data.find_task(id).ok_or_else(|| task_not_found(id))?;
            if existing.is_completed() {
                return Err(AppError::invalid_state(format!(
                    "task {id} is already completed"
                )));
            }
            let total = data
                .rewards
                .total_fragments
                .checked_add(1)
                .ok_or_else(|| AppError::invalid_state("fragment balance is full"))?;

            let task = find_task_mut(data, id)?;
            task.status = TaskStatus::Completed;
            task.completed_at = Some(now);
            let task = task.clone();

            data.rewards.total_fragments = total;
            data.dice_stats.completed_tasks = data.dice_stats.completed_tasks.saturating_add(1);
            Ok(task)
        })?;

        info!(
            task_id = id,
            balance = self.data.rewards.total_fragments,
            "task completed"
        );
        Ok(task)
    }

    /// Removes a task in any state. Fragments it earned stay earned.
    pub fn delete_task(&mut self, id: u64) -> Result<Task, AppError> {
        let task = self.commit(|data, _, _| {
            let index = data
                .tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or_else(|| task_not_found(id))?;
            Ok(data.tasks.remove(index))
        })?;

        info!(task_id = id, "task deleted");
        Ok(task)
    }

    pub fn add_reward(&mut self, name: &str, cost: i64) -> Result<Reward, AppError> {
        let name = required_name(name)?;
        let cost = match u32::try_from(cost) {
            Ok(cost) if cost > 0 => cost,
            _ => return Err(AppError::validation("cost must be a positive integer")),
        };

        let reward = self.commit(|data, _, _| {
            let reward = Reward {
                id: data.allocate_id(),
                name,
                cost,
            };
            data.rewards.reward_list.push(reward.clone());
            Ok(reward)
        })?;

        info!(reward_id = reward.id, cost, "reward added");
        Ok(reward)
    }

    /// Removes a reward from the list. Past redemptions keep their snapshot.
    pub fn delete_reward(&mut self, id: u64) -> Result<Reward, AppError> {
        let reward = self.commit(|data, _, _| {
            let list = &mut data.rewards.reward_list;
            let index = list
                .iter()
                .position(|reward| reward.id == id)
                .ok_or_else(|| reward_not_found(id))?;
            Ok(list.remove(index))
        })?;

        info!(reward_id = id, "reward deleted");
        Ok(reward)
    }

    pub fn redeem_reward(&mut self, reward_id: u64) -> Result<ExchangeRecord, AppError> {
        let record = self.commit(|data, now, _| {
            let reward = data
                .rewards
                .reward_list
                .iter()
                .find(|reward| reward.id == reward_id)
                .cloned()
                .ok_or_else(|| reward_not_found(reward_id))?;

            let ledger = &data.rewards;
            if ledger.total_fragments < reward.cost {
                return Err(AppError::InsufficientBalance {
                    cost: reward.cost,
                    balance: ledger.total_fragments,
                });
            }
            let used = ledger
                .used_fragments
                .checked_add(reward.cost)
                .ok_or_else(|| AppError::invalid_state("spent fragment count is full"))?;

            let record = ExchangeRecord {
                id: data.allocate_id(),
                reward_name: reward.name,
                cost: reward.cost,
                date: now,
            };
            let ledger = &mut data.rewards;
            ledger.total_fragments -= reward.cost;
            ledger.used_fragments = used;
            ledger.exchange_history.insert(0, record.clone());
            Ok(record)
        })?;

        info!(
            reward_id,
            cost = record.cost,
            balance = self.data.rewards.total_fragments,
            "reward redeemed"
        );
        Ok(record)
    }

    /// Zeroes the per-day roll counter. Deciding when a day ends is the
    /// caller's job.
    pub fn reset_today_rolls(&mut self) -> Result<DiceStats, AppError> {
        let stats = self.commit(|data, _, _| {
            data.dice_stats.today_rolls = 0;
            Ok(data.dice_stats)
        })?;

        info!("today's rolls reset");
        Ok(stats)
    }

    pub fn completed_task_count(&self) -> usize {
        stats::completed_task_count(&self.data)
    }

    pub fn total_earned_fragments(&self) -> u32 {
        stats::total_earned_fragments(&self.data)
    }

    pub fn exchanged_reward_count(&self) -> usize {
        stats::exchanged_reward_count(&self.data)
    }

    pub fn stats_summary(&self) -> StatsSummary {
        stats::summary(&self.data)
    }

    pub fn learning_feed(&self) -> Vec<FeedEntry> {
        stats::learning_feed(&self.data)
    }

    pub fn recent_completed_tasks(&self, limit: usize) -> Vec<Task> {
        stats::recent_completed_tasks(&self.data, limit)
    }

    pub fn daily_activity_histogram(&self, days: u32) -> Vec<DailyCount> {
        stats::daily_activity_histogram(&self.data, self.clock.now(), days)
    }

    fn commit<T>(
        &mut self,
        apply: impl FnOnce(&mut UserData, OffsetDateTime, &mut StdRng) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let now = self.clock.now();
        let mut next = self.data.clone();
        let value = apply(&mut next, now, &mut self.rng)?;
        self.gateway.save(&next)?;
        self.data = next;
        Ok(value)
    }
}

fn required_name(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    Ok(trimmed.to_string())
}

fn find_task_mut(data: &mut UserData, id: u64) -> Result<&mut Task, AppError> {
    data.tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or_else(|| task_not_found(id))
}

fn task_not_found(id: u64) -> AppError {
    AppError::not_found(format!("task {id} not found"))
}

fn reward_not_found(id: u64) -> AppError {
    AppError::not_found(format!("reward {id} not found"))
}
