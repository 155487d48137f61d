// 📚 Collection contract - Add/Delete over an ordered record sequence
//
// Both operations are pure: they take the current collection and return a
// new one. Insertion order is display order; new records always go last.

use crate::error::{FarmError, Result};
use crate::farm::{CollectionUpdate, FarmData};
use crate::schema::ValidationResult;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// COLLECTION KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Animals,
    HealthRecords,
    Finances,
    Labor,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Animals,
        CollectionKind::HealthRecords,
        CollectionKind::Finances,
        CollectionKind::Labor,
    ];

    /// Field name inside the persisted document
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Animals => "animals",
            CollectionKind::HealthRecords => "healthRecords",
            CollectionKind::Finances => "finances",
            CollectionKind::Labor => "labor",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "animals" | "animal" => Ok(CollectionKind::Animals),
            "healthrecords" | "health-records" | "health" => Ok(CollectionKind::HealthRecords),
            "finances" | "finance" => Ok(CollectionKind::Finances),
            "labor" | "labour" => Ok(CollectionKind::Labor),
            other => Err(format!(
                "unknown collection '{}' (expected animals, health, finances or labor)",
                other
            )),
        }
    }
}

// ============================================================================
// RECORD / DRAFT TRAITS
// ============================================================================

/// A stored entity with a store-assigned id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + 'static {
    const KIND: CollectionKind;

    fn id(&self) -> &str;

    /// The collection this record type lives in.
    fn collection(data: &FarmData) -> &[Self];

    fn into_update(items: Vec<Self>) -> CollectionUpdate;
}

/// An entity without an id, as submitted by a view.
pub trait Draft: Sized {
    type Record: Record;

    fn validate(&self) -> ValidationResult;

    /// Build the stored record, filling omitted dates with `today`.
    fn into_record(self, id: String, today: NaiveDate) -> Self::Record;
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Validate `draft`, give it a fresh id and append it.
///
/// On validation failure the input collection is untouched and every failing
/// field is reported.
pub fn add<D: Draft>(
    collection: &[D::Record],
    draft: D,
    today: NaiveDate,
) -> Result<(Vec<D::Record>, String)> {
    draft.validate().map_err(FarmError::Validation)?;

    let id = fresh_id(collection);
    let record = draft.into_record(id.clone(), today);

    let mut next = Vec::with_capacity(collection.len() + 1);
    next.extend_from_slice(collection);
    next.push(record);

    Ok((next, id))
}

/// Remove the record with `id`. A missing id leaves the collection as is.
pub fn delete<R: Record>(collection: &[R], id: &str) -> Vec<R> {
    collection
        .iter()
        .filter(|record| record.id() != id)
        .cloned()
        .collect()
}

pub fn contains<R: Record>(collection: &[R], id: &str) -> bool {
    collection.iter().any(|record| record.id() == id)
}

/// UUID v4, re-drawn in the (practically impossible) case of a clash.
fn fresh_id<R: Record>(collection: &[R]) -> String {
    loop {
        let id = uuid::Uuid::new_v4().to_string();
        if !contains(collection, &id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Animal, HealthRecord, NewAnimal, NewHealthRecord};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn herd(names: &[&str]) -> Vec<Animal> {
        let mut animals = Vec::new();
        for name in names {
            animals = add(&animals, NewAnimal::new(*name, "Goat"), today()).unwrap().0;
        }
        animals
    }

    #[test]
    fn test_add_appends_in_insertion_order() {
        let early = NewAnimal::new("Old", "Cow").with_entry_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let (animals, _) = add(&herd(&["A", "B"]), early, today()).unwrap();

        let names: Vec<&str> = animals.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "Old"]);
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let animals = herd(&["A", "B", "C", "D"]);
        let mut ids: Vec<&str> = animals.iter().map(|a| a.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_add_returns_new_id() {
        let (animals, id) = add(&[], NewAnimal::new("Lali", "Cow"), today()).unwrap();
        assert_eq!(animals[0].id, id);
        assert_eq!(animals[0].entry_date, today());
    }

    #[test]
    fn test_add_rejects_negative_cost_and_leaves_collection_unchanged() {
        let (records, _) = add(&[], NewHealthRecord::new("a1", "Fever", 100.0), today()).unwrap();
        let before: Vec<HealthRecord> = records.clone();

        let err = add(&records, NewHealthRecord::new("a1", "Fever", -10.0), today()).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.validation_errors()[0].field, "cost");
        assert_eq!(records, before);
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let animals = herd(&["A", "B"]);
        assert_eq!(delete(&animals, "nope"), animals);
    }

    #[test]
    fn test_delete_keeps_order_of_others() {
        let animals = herd(&["A", "B", "C"]);
        let remaining = delete(&animals, &animals[1].id);

        let names: Vec<&str> = remaining.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_collection_kind_parsing() {
        assert_eq!("health".parse::<CollectionKind>().unwrap(), CollectionKind::HealthRecords);
        assert_eq!("healthRecords".parse::<CollectionKind>().unwrap(), CollectionKind::HealthRecords);
        assert_eq!("Finance".parse::<CollectionKind>().unwrap(), CollectionKind::Finances);
        assert!("crops".parse::<CollectionKind>().is_err());
        for kind in CollectionKind::ALL {
            assert_eq!(kind.as_str().parse::<CollectionKind>().unwrap(), kind);
        }
    }

    proptest! {
        #[test]
        fn prop_add_then_delete_is_identity(
            names in proptest::collection::vec("[A-Za-z]{1,8}", 0..8),
            name in "[A-Za-z]{1,8}",
            species in "[A-Za-z]{1,8}",
        ) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let before = herd(&refs);

            let (after_add, id) = add(&before, NewAnimal::new(name, species), today()).unwrap();
            prop_assert_eq!(after_add.len(), before.len() + 1);
            prop_assert_eq!(delete(&after_add, &id), before);
        }

        #[test]
        fn prop_delete_is_idempotent(
            names in proptest::collection::vec("[A-Za-z]{1,8}", 1..8),
            pick in any::<prop::sample::Index>(),
        ) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let animals = herd(&refs);
            let id = animals[pick.index(animals.len())].id.clone();

            let once = delete(&animals, &id);
            let twice = delete(&once, &id);
            prop_assert_eq!(once, twice);
        }
    }
}
