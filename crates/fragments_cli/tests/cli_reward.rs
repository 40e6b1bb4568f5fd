use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("fragments-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_fragments");
    Command::new(exe)
        .args(args)
        .env("FRAGMENTS_STORE_PATH", store_path)
        .env("FRAGMENTS_CONFIG_PATH", store_path.with_extension("config.json"))
        .output()
        .expect("failed to run fragments")
}

fn read_store(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn seed_complete_then_redeem_expensive_reward() {
    let store_path = temp_path("cli-scenario.json");

    let done = run(&store_path, &["task", "done", "1"]);
    let redeemed = run(&store_path, &["reward", "redeem", "5"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(done.status.success());
    assert!(redeemed.status.success());
    let stdout = String::from_utf8_lossy(&redeemed.stdout);
    assert!(stdout.contains("balance 0"));

    let rewards = &stored["user_data"]["rewards"];
    assert_eq!(rewards["total_fragments"], 0);
    assert_eq!(rewards["used_fragments"], 4);
    let history = rewards["exchange_history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["reward_name"], "Ice cream");
    assert_eq!(history[0]["cost"], 3);
}

#[test]
fn redeem_rejects_insufficient_balance() {
    let store_path = temp_path("cli-redeem-poor.json");

    let output = run(&store_path, &["reward", "redeem", "5"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: insufficient_balance"));
    assert_eq!(stored["user_data"]["rewards"]["total_fragments"], 2);
}

#[test]
fn add_reward_validates_cost() {
    let store_path = temp_path("cli-reward-cost.json");

    let zero = run(&store_path, &["reward", "add", "Movie night", "0"]);
    let negative = run(&store_path, &["reward", "add", "Movie night", "-2"]);
    let added = run(&store_path, &["reward", "add", "Movie night", "5", "--json"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!zero.status.success());
    assert!(String::from_utf8_lossy(&zero.stderr).contains("ERROR: validation"));
    assert!(!negative.status.success());
    assert!(String::from_utf8_lossy(&negative.stderr).contains("ERROR: validation"));

    assert!(added.status.success());
    let reward: serde_json::Value = serde_json::from_slice(&added.stdout).unwrap();
    assert_eq!(reward["name"], "Movie night");
    assert_eq!(reward["cost"], 5);
}

#[test]
fn list_and_history_render_json() {
    let store_path = temp_path("cli-reward-list.json");

    let list = run(&store_path, &["reward", "list", "--json"]);
    let history = run(&store_path, &["reward", "history", "--json"]);
    std::fs::remove_file(&store_path).ok();

    let list: serde_json::Value = serde_json::from_slice(&list.stdout).unwrap();
    assert_eq!(list["balance"], 2);
    assert_eq!(list["rewards"].as_array().map(Vec::len), Some(2));

    let history: serde_json::Value = serde_json::from_slice(&history.stdout).unwrap();
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[test]
fn delete_reward_keeps_history() {
    let store_path = temp_path("cli-reward-delete.json");

    let deleted = run(&store_path, &["reward", "delete", "4"]);
    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(deleted.status.success());
    let rewards = &stored["user_data"]["rewards"];
    assert_eq!(rewards["reward_list"].as_array().map(Vec::len), Some(1));
    assert_eq!(rewards["exchange_history"].as_array().map(Vec::len), Some(1));
}
