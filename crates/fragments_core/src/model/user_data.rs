use super::{RewardsLedger, Task, TaskStatus};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceStats {
    pub completed_tasks: u32,
    pub used_rolls: u32,
    pub today_rolls: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub rewards: RewardsLedger,
    #[serde(default)]
    pub dice_stats: DiceStats,
    #[serde(default)]
    pub next_id: u64,
}

impl UserData {
    pub fn find_task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Highest id held by any task, reward or exchange record.
    pub fn max_id(&self) -> Option<u64> {
        let task_ids = self.tasks.iter().map(|task| task.id);
        let reward_ids = self.rewards.reward_list.iter().map(|reward| reward.id);
        let record_ids = self
            .rewards
            .exchange_history
            .iter()
            .map(|record| record.id);
        task_ids.chain(reward_ids).chain(record_ids).max()
    }

    /// Moves `next_id` past every id already in use. Snapshots written
    /// without the counter start allocating from the right place.
    pub fn reconcile_next_id(&mut self) {
        let floor = self.max_id().map_or(1, |max| max + 1);
        self.next_id = self.next_id.max(floor);
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn check_invariants(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        let mut in_progress = 0;

        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(AppError::invalid_data(format!("duplicate id {}", task.id)));
            }
            if task.name.trim().is_empty() {
                return Err(AppError::invalid_data(format!("task {} has no name", task.id)));
            }
            if task.is_completed() != task.completed_at.is_some() {
                return Err(AppError::invalid_data(format!(
                    "task {} completed_at does not match status",
                    task.id
                )));
            }
            if task.status == TaskStatus::InProgress {
                in_progress += 1;
            }
        }

        if in_progress > 1 {
            return Err(AppError::invalid_data("more than one task in progress"));
        }

        for reward in &self.rewards.reward_list {
            if !seen.insert(reward.id) {
                return Err(AppError::invalid_data(format!("duplicate id {}", reward.id)));
            }
            if reward.cost == 0 {
                return Err(AppError::invalid_data(format!(
                    "reward {} has zero cost",
                    reward.id
                )));
            }
        }

        for record in &self.rewards.exchange_history {
            if !seen.insert(record.id) {
                return Err(AppError::invalid_data(format!("duplicate id {}", record.id)));
            }
        }

        Ok(())
    }
}
