use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: u64,
    pub name: String,
    pub cost: u32,
}

/// A redemption, frozen at the time it happened. Later changes to the
/// reward list never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: u64,
    pub reward_name: String,
    pub cost: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsLedger {
    /// Spendable balance.
    pub total_fragments: u32,
    /// Lifetime amount spent on redemptions.
    pub used_fragments: u32,
    #[serde(default)]
    pub reward_list: Vec<Reward>,
    /// Newest first.
    #[serde(default)]
    pub exchange_history: Vec<ExchangeRecord>,
}
