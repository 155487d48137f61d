// 🩺 Health Record Entity - treatments and their cost
//
// `animal_id` is a soft reference: it is never checked against the animal
// inventory and may point at an animal that was deleted or never existed.

use crate::collection::{CollectionKind, Draft, Record};
use crate::farm::{CollectionUpdate, FarmData};
use crate::schema::{require_non_negative, require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub id: String,

    /// Soft reference to `Animal::id`
    pub animal_id: String,

    pub symptoms: String,

    pub treatment: String,

    /// Non-negative currency amount
    pub cost: f64,

    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthRecord {
    pub animal_id: String,
    pub symptoms: String,
    #[serde(default)]
    pub treatment: String,
    pub cost: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewHealthRecord {
    pub fn new(animal_id: impl Into<String>, symptoms: impl Into<String>, cost: f64) -> Self {
        NewHealthRecord {
            animal_id: animal_id.into(),
            symptoms: symptoms.into(),
            cost,
            ..NewHealthRecord::default()
        }
    }

    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment = treatment.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl Record for HealthRecord {
    const KIND: CollectionKind = CollectionKind::HealthRecords;

    fn id(&self) -> &str {
        &self.id
    }

    fn collection(data: &FarmData) -> &[Self] {
        &data.health_records
    }

    fn into_update(items: Vec<Self>) -> CollectionUpdate {
        CollectionUpdate::HealthRecords(items)
    }
}

impl Draft for NewHealthRecord {
    type Record = HealthRecord;

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require_text(&mut errors, "HealthRecord", "animalId", &self.animal_id);
        require_text(&mut errors, "HealthRecord", "symptoms", &self.symptoms);
        require_non_negative(&mut errors, "HealthRecord", "cost", self.cost);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_record(self, id: String, today: NaiveDate) -> HealthRecord {
        HealthRecord {
            id,
            animal_id: self.animal_id.trim().to_string(),
            symptoms: self.symptoms.trim().to_string(),
            treatment: self.treatment.trim().to_string(),
            cost: self.cost,
            date: self.date.unwrap_or(today),
        }
    }
}
