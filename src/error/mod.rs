mod app;
mod config;
mod script;
mod storage;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use script::ScriptError;
pub use storage::{StorageError, StorageOperation};
pub use validation::ValidationError;
