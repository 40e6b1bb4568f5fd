use super::Persistence;
use crate::error::AppError;
use crate::model::UserData;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_ENV_VAR: &str = "FRAGMENTS_STORE_PATH";
const STORE_FILE_NAME: &str = "userdata.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredUserData {
    schema_version: u32,
    user_data: UserData,
}

#[derive(Debug, Serialize)]
struct StoredUserDataRef<'a> {
    schema_version: u32,
    user_data: &'a UserData,
}

/// Snapshot kept as one pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonStore {
    fn load(&self) -> Result<Option<UserData>, AppError> {
        load_user_data(&self.path)
    }

    fn save(&mut self, data: &UserData) -> Result<(), AppError> {
        save_user_data(&self.path, data)
    }
}

/// Resolves the store location: `FRAGMENTS_STORE_PATH`, then the configured
/// path, then the per-user default.
pub fn store_path(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    Ok(crate::config::app_dir()?.join(STORE_FILE_NAME))
}

pub fn load_user_data(path: &Path) -> Result<Option<UserData>, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "no stored user data");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let stored: StoredUserData =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    debug!(
        path = %path.display(),
        tasks = stored.user_data.tasks.len(),
        "loaded user data"
    );
    Ok(Some(stored.user_data))
}

pub fn save_user_data(path: &Path, data: &UserData) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let stored = StoredUserDataRef {
        schema_version: SCHEMA_VERSION,
        user_data: data,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)?;
    }

    debug!(path = %path.display(), "saved user data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{JsonStore, SCHEMA_VERSION, load_user_data, save_user_data};
    use crate::model::{DiceStats, Task, TaskStatus, UserData};
    use crate::storage::Persistence;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::datetime;

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("fragments-{nanos}-{file_name}"))
    }

    fn sample() -> UserData {
        UserData {
            tasks: vec![Task {
                id: 1,
                name: "read".to_string(),
                status: TaskStatus::Completed,
                create_time: datetime!(2025-12-20 08:00 UTC),
                completed_at: Some(datetime!(2025-12-20 09:30 UTC)),
            }],
            dice_stats: DiceStats {
                completed_tasks: 1,
                used_rolls: 2,
                today_rolls: 1,
            },
            next_id: 2,
            ..UserData::default()
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let path = temp_path("missing.json");
        assert_eq!(load_user_data(&path).unwrap(), None);
    }

    #[test]
    fn save_then_load_returns_same_snapshot() {
        let path = temp_path("userdata.json");
        let mut store = JsonStore::new(&path);
        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, Some(sample()));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = temp_path("nested");
        let path = dir.join("deeper").join("userdata.json");
        save_user_data(&path, &UserData::default()).unwrap();
        let exists = path.exists();
        fs::remove_dir_all(&dir).ok();

        assert!(exists);
    }

    #[test]
    fn stored_document_uses_snake_case_and_rfc3339() {
        let path = temp_path("shape.json");
        save_user_data(&path, &sample()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(raw["schema_version"], SCHEMA_VERSION);
        let task = &raw["user_data"]["tasks"][0];
        assert_eq!(task["status"], "completed");
        assert_eq!(task["completed_at"], "2025-12-20T09:30:00Z");
        assert_eq!(raw["user_data"]["dice_stats"]["used_rolls"], 2);
    }

    #[test]
    fn accepts_snapshot_without_optional_fields() {
        let path = temp_path("sparse.json");
        let content = "{\n  \"schema_version\": 1,\n  \"user_data\": {\n    \"tasks\": [\n      {\n        \"id\": 4,\n        \"name\": \"demo\",\n        \"status\": \"pending\",\n        \"create_time\": \"2025-12-20T00:00:00Z\"\n      }\n    ]\n  }\n}";
        fs::write(&path, content).unwrap();

        let loaded = load_user_data(&path).unwrap().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].completed_at, None);
        assert_eq!(loaded.rewards.total_fragments, 0);
        assert_eq!(loaded.next_id, 0);
    }

    #[test]
    fn rejects_negative_balance() {
        let path = temp_path("negative.json");
        let content = serde_json::json!({
            "schema_version": 1,
            "user_data": {
                "rewards": { "total_fragments": -1, "used_fragments": 0 }
            }
        });
        fs::write(&path, content.to_string()).unwrap();

        let err = load_user_data(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn rejects_unknown_status() {
        let path = temp_path("bad-status.json");
        let content = serde_json::json!({
            "schema_version": 1,
            "user_data": {
                "tasks": [{
                    "id": 1,
                    "name": "demo",
                    "status": "archived",
                    "create_time": "2025-12-20T00:00:00Z"
                }]
            }
        });
        fs::write(&path, content.to_string()).unwrap();

        let err = load_user_data(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn schema_version_must_match() {
        let path = temp_path("bad-schema.json");
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"user_data\": {{}}\n}}",
            SCHEMA_VERSION + 1
        );
        fs::write(&path, bad).unwrap();

        let err = load_user_data(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
    }
}
