mod reward;
mod task;
mod user_data;

pub use reward::{ExchangeRecord, Reward, RewardsLedger};
pub use task::{Task, TaskStatus};
pub use user_data::{DiceStats, UserData};
