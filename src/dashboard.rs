// 📊 Dashboard Aggregator - summary metrics derived from FarmData
//
// Pure and stateless: recomputed from the current document on every read.
// Every figure is zero for empty collections.

use crate::entities::{Animal, AnimalStatus, EntryType, FinancialEntry, HealthRecord, LaborRecord};
use crate::farm::FarmData;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// STATUS COUNTS
// ============================================================================

/// One bucket per status, zeros included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "Healthy")]
    pub healthy: usize,
    #[serde(rename = "Sick")]
    pub sick: usize,
    #[serde(rename = "Recovering")]
    pub recovering: usize,
    #[serde(rename = "Sold")]
    pub sold: usize,
}

impl StatusCounts {
    pub fn get(&self, status: AnimalStatus) -> usize {
        match status {
            AnimalStatus::Healthy => self.healthy,
            AnimalStatus::Sick => self.sick,
            AnimalStatus::Recovering => self.recovering,
            AnimalStatus::Sold => self.sold,
        }
    }

    fn increment(&mut self, status: AnimalStatus) {
        match status {
            AnimalStatus::Healthy => self.healthy += 1,
            AnimalStatus::Sick => self.sick += 1,
            AnimalStatus::Recovering => self.recovering += 1,
            AnimalStatus::Sold => self.sold += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.sick + self.recovering + self.sold
    }
}

pub fn status_counts(animals: &[Animal]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for animal in animals {
        counts.increment(animal.status);
    }
    counts
}

// ============================================================================
// FINANCE TOTALS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinanceTotals {
    pub income: f64,
    pub expense: f64,
    /// income - expense
    pub balance: f64,
}

pub fn finance_totals(finances: &[FinancialEntry]) -> FinanceTotals {
    let mut totals = FinanceTotals::default();
    for entry in finances {
        match entry.entry_type {
            EntryType::Income => totals.income += entry.amount,
            EntryType::Expense => totals.expense += entry.amount,
        }
    }
    totals.balance = totals.income - totals.expense;
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

/// Expense totals per category, sorted by category name.
pub fn expenses_by_category(finances: &[FinancialEntry]) -> Vec<CategoryTotal> {
    let mut by_category: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for entry in finances.iter().filter(|e| e.entry_type == EntryType::Expense) {
        let slot = by_category.entry(entry.category.as_str()).or_insert((0.0, 0));
        slot.0 += entry.amount;
        slot.1 += 1;
    }

    by_category
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect()
}

// ============================================================================
// HEALTH / LABOR
// ============================================================================

pub fn health_spend(records: &[HealthRecord]) -> f64 {
    records.iter().fold(0.0, |total, r| total + r.cost)
}

/// Health records whose animal is no longer (or never was) in the inventory.
pub fn orphaned_health_records(animals: &[Animal], records: &[HealthRecord]) -> usize {
    let known: HashSet<&str> = animals.iter().map(|a| a.id.as_str()).collect();
    records
        .iter()
        .filter(|r| !known.contains(r.animal_id.as_str()))
        .count()
}

/// Sum of `hours * wage`, with `wage` read as an hourly rate.
pub fn labor_cost(labor: &[LaborRecord]) -> f64 {
    labor.iter().fold(0.0, |total, l| total + l.cost())
}

pub fn labor_hours(labor: &[LaborRecord]) -> f64 {
    labor.iter().fold(0.0, |total, l| total + l.hours)
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_animals: usize,
    pub status_counts: StatusCounts,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub health_spend: f64,
    pub health_record_count: usize,
    pub orphaned_health_records: usize,
    pub labor_cost: f64,
    pub labor_hours: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
}

pub fn summarize(data: &FarmData) -> DashboardSummary {
    let counts = status_counts(&data.animals);
    let finance = finance_totals(&data.finances);

    DashboardSummary {
        total_animals: data.animals.len(),
        status_counts: counts,
        total_income: finance.income,
        total_expense: finance.expense,
        balance: finance.balance,
        health_spend: health_spend(&data.health_records),
        health_record_count: data.health_records.len(),
        orphaned_health_records: orphaned_health_records(&data.animals, &data.health_records),
        labor_cost: labor_cost(&data.labor),
        labor_hours: labor_hours(&data.labor),
        expenses_by_category: expenses_by_category(&data.finances),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn animal(id: &str, status: AnimalStatus) -> Animal {
        Animal {
            id: id.to_string(),
            name: format!("Animal {}", id),
            species: "Cow".to_string(),
            status,
            entry_date: date(),
        }
    }

    fn entry(entry_type: EntryType, category: &str, amount: f64) -> FinancialEntry {
        FinancialEntry {
            id: format!("{}-{}", category, amount),
            entry_type,
            category: category.to_string(),
            amount,
            description: String::new(),
            date: date(),
        }
    }

    fn health(animal_id: &str, cost: f64) -> HealthRecord {
        HealthRecord {
            id: format!("h-{}-{}", animal_id, cost),
            animal_id: animal_id.to_string(),
            symptoms: "Fever".to_string(),
            treatment: String::new(),
            cost,
            date: date(),
        }
    }

    fn labor(hours: f64, wage: f64) -> LaborRecord {
        LaborRecord {
            id: format!("l-{}-{}", hours, wage),
            worker_name: "Rahim".to_string(),
            date: date(),
            hours,
            wage,
            task: "Milking".to_string(),
        }
    }

    #[test]
    fn test_empty_document_is_all_zero() {
        let summary = summarize(&FarmData::default());

        assert_eq!(summary.total_animals, 0);
        assert_eq!(summary.status_counts, StatusCounts::default());
        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.health_spend, 0.0);
        assert_eq!(summary.labor_cost, 0.0);
        assert_eq!(summary.labor_hours, 0.0);
        assert_eq!(summary.orphaned_health_records, 0);
        assert!(summary.expenses_by_category.is_empty());
    }

    #[test]
    fn test_income_expense_balance() {
        let totals = finance_totals(&[
            entry(EntryType::Income, "Milk", 500.0),
            entry(EntryType::Expense, "Feed", 120.0),
        ]);

        assert_eq!(totals.income, 500.0);
        assert_eq!(totals.expense, 120.0);
        assert_eq!(totals.balance, 380.0);
    }

    #[test]
    fn test_balance_can_go_negative() {
        let totals = finance_totals(&[entry(EntryType::Expense, "Vet", 75.0)]);
        assert_eq!(totals.balance, -75.0);
    }

    #[test]
    fn test_status_counts_include_zero_buckets() {
        let counts = status_counts(&[
            animal("1", AnimalStatus::Healthy),
            animal("2", AnimalStatus::Healthy),
            animal("3", AnimalStatus::Sick),
            animal("4", AnimalStatus::Sold),
        ]);

        assert_eq!(counts.get(AnimalStatus::Healthy), 2);
        assert_eq!(counts.get(AnimalStatus::Sick), 1);
        assert_eq!(counts.get(AnimalStatus::Recovering), 0);
        assert_eq!(counts.get(AnimalStatus::Sold), 1);
        assert_eq!(counts.total(), 4);

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json, serde_json::json!({"Healthy": 2, "Sick": 1, "Recovering": 0, "Sold": 1}));
    }

    #[test]
    fn test_health_spend_covers_all_animals_including_orphans() {
        let animals = vec![animal("1", AnimalStatus::Sick)];
        let records = vec![health("1", 100.0), health("1", 50.5), health("gone", 20.0)];

        assert_eq!(health_spend(&records), 170.5);
        assert_eq!(orphaned_health_records(&animals, &records), 1);
    }

    #[test]
    fn test_labor_cost_multiplies_hours_by_rate() {
        let records = vec![labor(8.0, 50.0), labor(2.5, 40.0)];
        assert_eq!(labor_cost(&records), 500.0);
        assert_eq!(labor_hours(&records), 10.5);
    }

    #[test]
    fn test_expenses_grouped_by_category() {
        let grouped = expenses_by_category(&[
            entry(EntryType::Expense, "Feed", 100.0),
            entry(EntryType::Income, "Milk", 900.0),
            entry(EntryType::Expense, "Vet", 30.0),
            entry(EntryType::Expense, "Feed", 25.0),
        ]);

        assert_eq!(
            grouped,
            vec![
                CategoryTotal { category: "Feed".to_string(), total: 125.0, count: 2 },
                CategoryTotal { category: "Vet".to_string(), total: 30.0, count: 1 },
            ]
        );
    }

    #[test]
    fn test_summary_json_shape() {
        let data = FarmData {
            animals: vec![animal("1", AnimalStatus::Recovering)],
            health_records: vec![health("1", 10.0)],
            finances: vec![entry(EntryType::Income, "Eggs", 40.0)],
            labor: vec![labor(1.0, 30.0)],
        };

        let json = serde_json::to_value(summarize(&data)).unwrap();
        assert_eq!(json["totalAnimals"], 1);
        assert_eq!(json["statusCounts"]["Recovering"], 1);
        assert_eq!(json["balance"], 40.0);
        assert_eq!(json["healthSpend"], 10.0);
        assert_eq!(json["laborCost"], 30.0);
    }
}
