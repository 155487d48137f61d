// 👷 Labor Record Entity - worker hours and wages
//
// `wage` is an hourly rate. The cost of an entry is `hours * wage`.

use crate::collection::{CollectionKind, Draft, Record};
use crate::farm::{CollectionUpdate, FarmData};
use crate::schema::{require_non_negative, require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRecord {
    pub id: String,

    pub worker_name: String,

    pub date: NaiveDate,

    pub hours: f64,

    /// Hourly rate
    pub wage: f64,

    pub task: String,
}

impl LaborRecord {
    pub fn cost(&self) -> f64 {
        self.hours * self.wage
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLaborRecord {
    pub worker_name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub hours: f64,
    pub wage: f64,
    pub task: String,
}

impl NewLaborRecord {
    pub fn new(worker_name: impl Into<String>, task: impl Into<String>, hours: f64, wage: f64) -> Self {
        NewLaborRecord {
            worker_name: worker_name.into(),
            date: None,
            hours,
            wage,
            task: task.into(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl Record for LaborRecord {
    const KIND: CollectionKind = CollectionKind::Labor;

    fn id(&self) -> &str {
        &self.id
    }

    fn collection(data: &FarmData) -> &[Self] {
        &data.labor
    }

    fn into_update(items: Vec<Self>) -> CollectionUpdate {
        CollectionUpdate::Labor(items)
    }
}

impl Draft for NewLaborRecord {
    type Record = LaborRecord;

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require_text(&mut errors, "LaborRecord", "workerName", &self.worker_name);
        require_text(&mut errors, "LaborRecord", "task", &self.task);
        require_non_negative(&mut errors, "LaborRecord", "hours", self.hours);
        require_non_negative(&mut errors, "LaborRecord", "wage", self.wage);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_record(self, id: String, today: NaiveDate) -> LaborRecord {
        LaborRecord {
            id,
            worker_name: self.worker_name.trim().to_string(),
            date: self.date.unwrap_or(today),
            hours: self.hours,
            wage: self.wage,
            task: self.task.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_is_hours_times_hourly_wage() {
        let record = NewLaborRecord::new("Rahim", "Milking", 8.0, 62.5)
            .into_record("l1".to_string(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        assert_eq!(record.cost(), 500.0);
    }

    #[test]
    fn test_negative_hours_and_wage_are_rejected() {
        let errors = NewLaborRecord::new("Rahim", "Milking", -1.0, -5.0)
            .validate()
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["hours", "wage"]);
    }

    #[test]
    fn test_worker_name_serializes_as_camel_case() {
        let record = NewLaborRecord::new("Rahim", "Feeding", 2.0, 50.0)
            .into_record("l1".to_string(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["workerName"], "Rahim");
        assert_eq!(value["hours"], 2.0);
    }
}
