use crate::model::{DiceStats, ExchangeRecord, Reward, RewardsLedger, Task, TaskStatus, UserData};
use time::{Duration, OffsetDateTime};

/// First-run dataset: two pending tasks, one finished yesterday, two
/// rewards and a redemption from two days ago.
pub fn default_user_data(now: OffsetDateTime) -> UserData {
    let yesterday = now - Duration::days(1);
    let two_days_ago = now - Duration::days(2);

    let tasks = vec![
        Task {
            id: 1,
            name: "Read for 30 minutes".to_string(),
            status: TaskStatus::Pending,
            create_time: now,
            completed_at: None,
        },
        Task {
            id: 2,
            name: "Practice programming for 1 hour".to_string(),
            status: TaskStatus::Pending,
            create_time: now,
            completed_at: None,
        },
        Task {
            id: 3,
            name: "Memorize 10 words".to_string(),
            status: TaskStatus::Completed,
            create_time: yesterday,
            completed_at: Some(yesterday),
        },
    ];

    let rewards = RewardsLedger {
        total_fragments: 2,
        used_fragments: 1,
        reward_list: vec![
            Reward {
                id: 4,
                name: "Take a 30 minute break".to_string(),
                cost: 1,
            },
            Reward {
                id: 5,
                name: "Ice cream".to_string(),
                cost: 3,
            },
        ],
        exchange_history: vec![ExchangeRecord {
            id: 6,
            reward_name: "Take a 30 minute break".to_string(),
            cost: 1,
            date: two_days_ago,
        }],
    };

    UserData {
        tasks,
        rewards,
        dice_stats: DiceStats {
            completed_tasks: 1,
            used_rolls: 0,
            today_rolls: 0,
        },
        next_id: 7,
    }
}
