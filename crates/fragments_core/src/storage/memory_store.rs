use super::Persistence;
use crate::error::AppError;
use crate::model::UserData;

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Option<UserData>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(data: UserData) -> Self {
        Self {
            snapshot: Some(data),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Option<&UserData> {
        self.snapshot.as_ref()
    }

    /// Number of successful flushes so far.
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> Result<Option<UserData>, AppError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, data: &UserData) -> Result<(), AppError> {
        if self.fail_saves {
            return Err(AppError::io("memory store rejected the write"));
        }
        self.snapshot = Some(data.clone());
        self.saves += 1;
        Ok(())
    }
}
