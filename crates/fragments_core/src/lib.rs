pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod seed;
pub mod selector;
pub mod stats;
pub mod storage;
pub mod store;

pub use error::AppError;
pub use store::DomainStore;
