// Entity Models - the four farm record collections
//
// Each entity has:
// - Stable identity (UUID) assigned by the store, never by the caller
// - A draft type (`New*`) holding every field except the id
// - Camel-case JSON field names, matching the persisted document

pub mod animal;
pub mod health;
pub mod finance;
pub mod labor;

pub use animal::{Animal, AnimalStatus, NewAnimal};
pub use health::{HealthRecord, NewHealthRecord};
pub use finance::{EntryType, FinancialEntry, NewFinancialEntry};
pub use labor::{LaborRecord, NewLaborRecord};
