pub mod db;
pub mod error;
pub mod migration;
pub mod repositories;
mod rows;

pub use db::Journal;
pub use error::StorageError;
pub use migration::{MigrationReport, migrate_from_json};
