// 🌾 Farm Data - the aggregate document
//
// One document holds all four collections and is the unit of persistence.
// Changes are expressed as whole-collection replacements.

use crate::entities::{Animal, FinancialEntry, HealthRecord, LaborRecord};
use crate::schema::{require_finite, ValidationResult};
use serde::{Deserialize, Serialize};

/// Well-known key the document is stored under.
pub const STORAGE_KEY: &str = "agroflow_data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmData {
    pub animals: Vec<Animal>,
    pub health_records: Vec<HealthRecord>,
    pub finances: Vec<FinancialEntry>,
    pub labor: Vec<LaborRecord>,
}

/// A replacement for exactly one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionUpdate {
    Animals(Vec<Animal>),
    HealthRecords(Vec<HealthRecord>),
    Finances(Vec<FinancialEntry>),
    Labor(Vec<LaborRecord>),
}

impl FarmData {
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
            && self.health_records.is_empty()
            && self.finances.is_empty()
            && self.labor.is_empty()
    }

    /// Returns a document equal to `self` except for the replaced collection.
    pub fn with_collection(mut self, update: CollectionUpdate) -> FarmData {
        match update {
            CollectionUpdate::Animals(animals) => self.animals = animals,
            CollectionUpdate::HealthRecords(records) => self.health_records = records,
            CollectionUpdate::Finances(finances) => self.finances = finances,
            CollectionUpdate::Labor(labor) => self.labor = labor,
        }
        self
    }

    /// Parse a persisted document. Anything that is not a well-formed
    /// document yields `None`.
    pub fn from_json(raw: &str) -> Option<FarmData> {
        if raw.trim().is_empty() {
            return None;
        }
        serde_json::from_str(raw).ok()
    }

    /// Every number must survive a save/load cycle. A single NaN would be
    /// written as `null` and make the whole document unreadable.
    pub fn check_finite(&self) -> ValidationResult {
        let mut errors = Vec::new();
        for record in &self.health_records {
            require_finite(&mut errors, &format!("HealthRecord {}", record.id), "cost", record.cost);
        }
        for entry in &self.finances {
            require_finite(&mut errors, &format!("FinancialEntry {}", entry.id), "amount", entry.amount);
        }
        for record in &self.labor {
            let context = format!("LaborRecord {}", record.id);
            require_finite(&mut errors, &context, "hours", record.hours);
            require_finite(&mut errors, &context, "wage", record.wage);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Health records whose `animalId` matches, in insertion order.
    pub fn health_records_for<'a, 'b>(
        &'a self,
        animal_id: &'b str,
    ) -> impl Iterator<Item = &'a HealthRecord> + 'b
    where
        'a: 'b,
    {
        self.health_records
            .iter()
            .filter(move |record| record.animal_id == animal_id)
    }

    pub fn find_animal(&self, id: &str) -> Option<&Animal> {
        self.animals.iter().find(|animal| animal.id == id)
    }
}
