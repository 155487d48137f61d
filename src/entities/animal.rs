// 🐄 Animal Entity - livestock inventory
//
// "Animal name is a VALUE (can change), Animal id is IDENTITY (never changes)"
//
// Status transitions are free-form: any status may follow any other.
// Deleting an animal never touches its health records.

use crate::collection::{CollectionKind, Draft, Record};
use crate::farm::{CollectionUpdate, FarmData};
use crate::schema::{require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ANIMAL STATUS
// ============================================================================

/// Persisted as exactly `Healthy`, `Sick`, `Recovering`, `Sold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum AnimalStatus {
    #[default]
    Healthy,
    Sick,
    Recovering,
    Sold,
}

impl AnimalStatus {
    pub const ALL: [AnimalStatus; 4] = [
        AnimalStatus::Healthy,
        AnimalStatus::Sick,
        AnimalStatus::Recovering,
        AnimalStatus::Sold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Healthy => "Healthy",
            AnimalStatus::Sick => "Sick",
            AnimalStatus::Recovering => "Recovering",
            AnimalStatus::Sold => "Sold",
        }
    }

    /// Cycle used by the terminal UI's "change status" key.
    pub fn next(&self) -> Self {
        match self {
            AnimalStatus::Healthy => AnimalStatus::Sick,
            AnimalStatus::Sick => AnimalStatus::Recovering,
            AnimalStatus::Recovering => AnimalStatus::Sold,
            AnimalStatus::Sold => AnimalStatus::Healthy,
        }
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AnimalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimalStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown animal status '{}' (expected Healthy, Sick, Recovering or Sold)", s)
            })
    }
}

// ============================================================================
// ANIMAL ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    /// Stable identity (UUID) - NEVER changes
    pub id: String,

    pub name: String,

    /// Free text, e.g. "Cow", "Goat", "Chicken"
    pub species: String,

    pub status: AnimalStatus,

    /// Day the animal joined the farm
    pub entry_date: NaiveDate,
}

/// An animal as submitted by a view, before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub status: AnimalStatus,
    /// Defaults to the current date when omitted
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
}

impl NewAnimal {
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        NewAnimal {
            name: name.into(),
            species: species.into(),
            ..NewAnimal::default()
        }
    }

    pub fn with_status(mut self, status: AnimalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }
}

impl Record for Animal {
    const KIND: CollectionKind = CollectionKind::Animals;

    fn id(&self) -> &str {
        &self.id
    }

    fn collection(data: &FarmData) -> &[Self] {
        &data.animals
    }

    fn into_update(items: Vec<Self>) -> CollectionUpdate {
        CollectionUpdate::Animals(items)
    }
}

impl Draft for NewAnimal {
    type Record = Animal;

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require_text(&mut errors, "Animal", "name", &self.name);
        require_text(&mut errors, "Animal", "species", &self.species);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_record(self, id: String, today: NaiveDate) -> Animal {
        Animal {
            id,
            name: self.name.trim().to_string(),
            species: self.species.trim().to_string(),
            status: self.status,
            entry_date: self.entry_date.unwrap_or(today),
        }
    }
}
