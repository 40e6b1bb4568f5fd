use crate::error::AppError;
use crate::model::UserData;

pub mod json_store;
mod memory_store;

pub use json_store::JsonStore;
pub use memory_store::MemoryStore;

/// Where the domain store keeps its single snapshot. Implementations
/// store the whole aggregate on every call; there are no partial writes.
pub trait Persistence {
    fn load(&self) -> Result<Option<UserData>, AppError>;

    fn save(&mut self, data: &UserData) -> Result<(), AppError>;
}
