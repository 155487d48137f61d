// AgroFlow - Farm Record Keeping Core Library
// Exposes all modules for use in CLI, terminal UI, API server, and tests

pub mod entities;   // Animal, HealthRecord, FinancialEntry, LaborRecord
pub mod schema;     // Draft validation
pub mod error;
pub mod farm;       // FarmData aggregate document
pub mod collection; // Add/Delete contract
pub mod storage;    // Storage trait + memory/file/sqlite backends
pub mod store;      // Farm State Store
pub mod dashboard;  // Dashboard Aggregator
pub mod config;
pub mod logging;    // tracing subscriber setup

// Re-export commonly used types
pub use entities::{
    Animal, AnimalStatus, NewAnimal,
    HealthRecord, NewHealthRecord,
    FinancialEntry, EntryType, NewFinancialEntry,
    LaborRecord, NewLaborRecord,
};
pub use schema::{ValidationError, ValidationResult};
pub use error::{FarmError, Result, StorageError};
pub use farm::{CollectionUpdate, FarmData, STORAGE_KEY};
pub use collection::{CollectionKind, Draft, Record};
pub use storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
pub use store::FarmStore;
pub use dashboard::{summarize, DashboardSummary, StatusCounts};
pub use config::{AppConfig, Backend};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
