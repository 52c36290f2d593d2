//! # ts-db
//!
//! Database layer for Timesheet RS.
//!
//! PostgreSQL access via SQLx:
//!
//! - Connection pool management
//! - Schema bootstrap (tables are created at startup if missing)
//! - Repositories for `users`, `clients`, and `time_entries`
//!
//! ## Example
//!
//! ```ignore
//! use ts_db::{Database, DatabaseConfig};
//! use ts_db::time_entries::TimeEntryRepository;
//!
//! let db = Database::connect(&DatabaseConfig::from_env()).await?;
//! let repo = TimeEntryRepository::new(db.pool().clone());
//! let rows = repo.find_in_range(7, start, end).await?;
//! ```

pub mod clients;
pub mod pool;
pub mod repository;
pub mod schema;
pub mod time_entries;
pub mod users;

pub use clients::{ClientRepository, ClientRow, CreateClientDto, UpdateClientDto};
pub use pool::{Database, DatabaseConfig};
pub use repository::{RepositoryError, RepositoryResult};
pub use time_entries::{
    AdminEntryUpdateDto, EntryFilter, InsertEntryDto, TimeEntryRepository, TimeEntryRow,
    UpdateEntryDto,
};
pub use users::{CreateUserDto, ProfileUpdateDto, UpdateUserDto, UserRepository, UserRow};
