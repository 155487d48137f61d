// 💰 Financial Entry Entity - income and expense ledger
//
// `amount` is always a non-negative magnitude; the sign is carried by
// `entry_type`.

use crate::collection::{CollectionKind, Draft, Record};
use crate::farm::{CollectionUpdate, FarmData};
use crate::schema::{require_non_negative, require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTRY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    #[serde(rename = "INCOME")]
    Income,

    #[serde(rename = "EXPENSE")]
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "INCOME",
            EntryType::Expense => "EXPENSE",
        }
    }

    /// +1 for income, -1 for expense
    pub fn sign(&self) -> f64 {
        match self {
            EntryType::Income => 1.0,
            EntryType::Expense => -1.0,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INCOME" => Ok(EntryType::Income),
            "EXPENSE" => Ok(EntryType::Expense),
            other => Err(format!("unknown entry type '{}' (expected INCOME or EXPENSE)", other)),
        }
    }
}

// ============================================================================
// FINANCIAL ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntry {
    pub id: String,

    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Free text, e.g. "Milk sales", "Feed"
    pub category: String,

    pub amount: f64,

    pub description: String,

    pub date: NaiveDate,
}

impl FinancialEntry {
    /// Amount with the sign implied by the entry type
    pub fn signed_amount(&self) -> f64 {
        self.entry_type.sign() * self.amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinancialEntry {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewFinancialEntry {
    pub fn new(entry_type: EntryType, category: impl Into<String>, amount: f64) -> Self {
        NewFinancialEntry {
            entry_type,
            category: category.into(),
            amount,
            description: String::new(),
            date: None,
        }
    }

    pub fn income(category: impl Into<String>, amount: f64) -> Self {
        Self::new(EntryType::Income, category, amount)
    }

    pub fn expense(category: impl Into<String>, amount: f64) -> Self {
        Self::new(EntryType::Expense, category, amount)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

impl Record for FinancialEntry {
    const KIND: CollectionKind = CollectionKind::Finances;

    fn id(&self) -> &str {
        &self.id
    }

    fn collection(data: &FarmData) -> &[Self] {
        &data.finances
    }

    fn into_update(items: Vec<Self>) -> CollectionUpdate {
        CollectionUpdate::Finances(items)
    }
}

impl Draft for NewFinancialEntry {
    type Record = FinancialEntry;

    fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        require_text(&mut errors, "FinancialEntry", "category", &self.category);
        require_non_negative(&mut errors, "FinancialEntry", "amount", self.amount);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn into_record(self, id: String, today: NaiveDate) -> FinancialEntry {
        FinancialEntry {
            id,
            entry_type: self.entry_type,
            category: self.category.trim().to_string(),
            amount: self.amount,
            description: self.description.trim().to_string(),
            date: self.date.unwrap_or(today),
        }
    }
}
