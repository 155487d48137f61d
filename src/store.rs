// 🏠 Farm State Store - single source of truth for FarmData
//
// Every mutation follows the same path:
//   compute next document -> persist it -> swap it in -> notify observers
// If the write fails the in-memory document is left untouched, so readers
// never see a state that was not persisted.

use crate::collection::{self, CollectionKind, Draft, Record};
use crate::entities::{Animal, AnimalStatus, FinancialEntry, HealthRecord, LaborRecord};
use crate::error::{FarmError, Result};
use crate::farm::{CollectionUpdate, FarmData, STORAGE_KEY};
use crate::schema::describe;
use crate::storage::Storage;
use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

/// Called with the new document after every successful mutation.
pub type Observer = Box<dyn Fn(&FarmData) + Send>;

pub struct FarmStore {
    storage: Box<dyn Storage>,
    key: String,
    data: FarmData,
    observers: Vec<Observer>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl FarmStore {
    /// Hydrate from `storage` under the default key.
    pub fn open(storage: impl Storage + 'static) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    pub fn open_with_key(storage: impl Storage + 'static, key: &str) -> Self {
        let data = Self::load(&storage, key);
        FarmStore {
            storage: Box::new(storage),
            key: key.to_string(),
            data,
            observers: Vec::new(),
            today: local_today,
        }
    }

    /// Replace the clock used to default omitted dates.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    // ========================================================================
    // LOAD / PERSIST
    // ========================================================================

    /// Read the persisted document. Missing, unreadable or malformed state
    /// falls back to the empty document; this never fails.
    pub fn load(storage: &dyn Storage, key: &str) -> FarmData {
        let raw = match storage.load(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(key, "no saved farm data, starting empty");
                return FarmData::default();
            }
            Err(e) => {
                warn!(key, error = %e, "could not read saved farm data, starting empty");
                return FarmData::default();
            }
        };

        match FarmData::from_json(&raw) {
            Some(data) => {
                info!(
                    key,
                    animals = data.animals.len(),
                    health_records = data.health_records.len(),
                    finances = data.finances.len(),
                    labor = data.labor.len(),
                    "loaded farm data"
                );
                data
            }
            None => {
                warn!(key, bytes = raw.len(), "saved farm data is corrupted, starting empty");
                FarmData::default()
            }
        }
    }

    /// Serialize and write the whole document. A document that could not be
    /// read back (non-finite numbers) is refused before anything is written.
    pub fn persist(storage: &mut dyn Storage, key: &str, data: &FarmData) -> Result<()> {
        data.check_finite().map_err(FarmError::Validation)?;
        let raw = data.to_json()?;
        storage.save(key, &raw)?;
        debug!(key, bytes = raw.len(), "persisted farm data");
        Ok(())
    }

    fn commit(&mut self, next: FarmData) -> Result<()> {
        if let Err(e) = Self::persist(self.storage.as_mut(), &self.key, &next) {
            warn!(error = %e, "farm data not saved, keeping previous state");
            return Err(e);
        }

        self.data = next;
        for observer in &self.observers {
            observer(&self.data);
        }
        Ok(())
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn data(&self) -> &FarmData {
        &self.data
    }

    pub fn list<R: Record>(&self) -> &[R] {
        R::collection(&self.data)
    }

    pub fn animals(&self) -> &[Animal] {
        &self.data.animals
    }

    pub fn health_records(&self) -> &[HealthRecord] {
        &self.data.health_records
    }

    pub fn finances(&self) -> &[FinancialEntry] {
        &self.data.finances
    }

    pub fn labor(&self) -> &[LaborRecord] {
        &self.data.labor
    }

    pub fn health_records_for(&self, animal_id: &str) -> Vec<&HealthRecord> {
        self.data
            .health_records
            .iter()
            .filter(|record| record.animal_id == animal_id)
            .collect()
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    pub fn subscribe(&mut self, observer: impl Fn(&FarmData) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Swap one collection wholesale; the other three are untouched.
    pub fn replace_collection(&mut self, update: CollectionUpdate) -> Result<()> {
        let next = self.data.clone().with_collection(update);
        self.commit(next)
    }

    /// Add a record and return its new id.
    pub fn add<D: Draft>(&mut self, draft: D) -> Result<String> {
        let kind = D::Record::KIND;
        let current = D::Record::collection(&self.data);

        let (items, id) = match collection::add(current, draft, (self.today)()) {
            Ok(added) => added,
            Err(e) => {
                debug!(collection = %kind, errors = %describe(e.validation_errors()), "rejected add");
                return Err(e);
            }
        };

        self.replace_collection(D::Record::into_update(items))?;
        info!(collection = %kind, id = %id, "added record");
        Ok(id)
    }

    /// Remove a record by id. Returns whether anything was removed; a
    /// missing id neither persists nor notifies.
    pub fn delete<R: Record>(&mut self, id: &str) -> Result<bool> {
        let kind = R::KIND;
        let current = R::collection(&self.data);
        if !collection::contains(current, id) {
            debug!(collection = %kind, id, "delete of unknown id ignored");
            return Ok(false);
        }

        let items = collection::delete(current, id);
        self.replace_collection(R::into_update(items))?;
        info!(collection = %kind, id, "deleted record");
        Ok(true)
    }

    /// Delete by collection name, for callers that only know the kind at
    /// runtime (CLI, terminal UI).
    pub fn delete_in(&mut self, kind: CollectionKind, id: &str) -> Result<bool> {
        match kind {
            CollectionKind::Animals => self.delete::<Animal>(id),
            CollectionKind::HealthRecords => self.delete::<HealthRecord>(id),
            CollectionKind::Finances => self.delete::<FinancialEntry>(id),
            CollectionKind::Labor => self.delete::<LaborRecord>(id),
        }
    }

    /// Free-form status change. Returns `false` if no animal has `id`.
    pub fn set_animal_status(&mut self, id: &str, status: AnimalStatus) -> Result<bool> {
        let Some(index) = self.data.animals.iter().position(|a| a.id == id) else {
            return Ok(false);
        };

        if self.data.animals[index].status == status {
            return Ok(true);
        }

        let mut animals = self.data.animals.clone();
        animals[index].status = status;
        self.replace_collection(CollectionUpdate::Animals(animals))?;
        info!(id, status = %status, "changed animal status");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{NewAnimal, NewFinancialEntry, NewHealthRecord, NewLaborRecord};
    use crate::error::{FarmError, StorageError};
    use crate::storage::MemoryStorage;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn new_store() -> (FarmStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = FarmStore::open(storage.clone()).with_clock(fixed_today);
        (store, storage)
    }

    fn seeded_store() -> (FarmStore, MemoryStorage) {
        let (mut store, storage) = new_store();
        let lali = store.add(NewAnimal::new("Lali", "Cow")).unwrap();
        store.add(NewAnimal::new("Kalo", "Goat").with_status(AnimalStatus::Sick)).unwrap();
        store.add(NewHealthRecord::new(lali, "Fever", 250.0)).unwrap();
        store.add(NewFinancialEntry::income("Milk", 500.0)).unwrap();
        store.add(NewLaborRecord::new("Rahim", "Milking", 8.0, 60.0)).unwrap();
        (store, storage)
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStorage;

    impl Storage for ReadOnlyStorage {
        fn load(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&mut self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }
    }

    /// Storage whose reads always fail.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn load(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("no backend".to_string()))
        }

        fn save(&mut self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_first_run_is_empty() {
        let (store, storage) = new_store();
        assert_eq!(store.data(), &FarmData::default());
        // Loading alone does not write anything
        assert_eq!(storage.get(STORAGE_KEY), None);
    }

    #[test]
    fn test_corrupted_state_loads_empty() {
        for raw in ["", "   ", "{oops", "[]", r#"{"animals":[{"id":1}]}"#] {
            let store = FarmStore::open(MemoryStorage::with_entry(STORAGE_KEY, raw));
            assert_eq!(store.data(), &FarmData::default(), "input: {:?}", raw);
        }
    }

    #[test]
    fn test_unreadable_storage_loads_empty() {
        let store = FarmStore::open(BrokenStorage);
        assert!(store.data().is_empty());
    }

    #[test]
    fn test_every_mutation_rewrites_document() {
        let (mut store, storage) = new_store();
        let id = store.add(NewAnimal::new("Lali", "Cow")).unwrap();

        let saved = FarmData::from_json(&storage.get(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(&saved, store.data());
        assert_eq!(saved.animals[0].id, id);
        assert_eq!(saved.animals[0].entry_date, fixed_today());

        store.delete::<Animal>(&id).unwrap();
        let saved = FarmData::from_json(&storage.get(STORAGE_KEY).unwrap()).unwrap();
        assert!(saved.animals.is_empty());
    }

    #[test]
    fn test_reopen_sees_previous_session() {
        let (store, storage) = seeded_store();
        let reopened = FarmStore::open(storage);
        assert_eq!(reopened.data(), store.data());
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let storage = MemoryStorage::new();
        let mut store = FarmStore::open_with_key(storage.clone(), "test_farm");
        store.add(NewAnimal::new("Lali", "Cow")).unwrap();

        assert!(storage.get("test_farm").is_some());
        assert!(storage.get(STORAGE_KEY).is_none());
    }

    #[test]
    fn test_rejected_add_leaves_state_and_storage_unchanged() {
        let (mut store, storage) = seeded_store();
        let before = store.data().clone();
        let saved_before = storage.get(STORAGE_KEY);

        let err = store
            .add(NewHealthRecord::new("a1", "Fever", -10.0))
            .unwrap_err();

        assert!(matches!(err, FarmError::Validation(_)));
        assert_eq!(store.data(), &before);
        assert_eq!(storage.get(STORAGE_KEY), saved_before);
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let mut store = FarmStore::open(ReadOnlyStorage);
        let err = store.add(NewAnimal::new("Lali", "Cow")).unwrap_err();

        assert!(matches!(err, FarmError::Storage(_)));
        assert!(store.animals().is_empty());
    }

    #[test]
    fn test_delete_does_not_cascade() {
        let (mut store, _) = seeded_store();
        let lali = store.animals()[0].id.clone();

        assert!(store.delete::<Animal>(&lali).unwrap());
        assert_eq!(store.health_records_for(&lali).len(), 1);
    }

    #[test]
    fn test_replace_with_nan_is_refused_and_saved_data_survives() {
        let (mut store, storage) = new_store();
        store.add(NewAnimal::new("Lali", "Cow")).unwrap();

        let mut broken = store.health_records().to_vec();
        broken.push(HealthRecord {
            id: "h-nan".to_string(),
            animal_id: store.animals()[0].id.clone(),
            symptoms: "Fever".to_string(),
            treatment: String::new(),
            cost: f64::NAN,
            date: fixed_today(),
        });

        let err = store.replace_collection(CollectionUpdate::HealthRecords(broken)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.validation_errors()[0].field, "cost");
        assert!(store.health_records().is_empty());

        let reopened = FarmStore::open(storage);
        assert_eq!(reopened.animals().len(), 1);
        assert!(reopened.health_records().is_empty());
    }

    #[test]
    fn test_health_history_outlives_the_lookup_key() {
        let (store, _) = seeded_store();

        let history = {
            let key = store.animals()[0].id.clone();
            store.health_records_for(&key)
        };

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].symptoms, "Fever");
    }

    #[test]
    fn test_delete_missing_id_is_silent_noop() {
        let (mut store, _) = seeded_store();
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let before = store.data().clone();
        assert!(!store.delete::<FinancialEntry>("missing").unwrap());
        assert!(!store.delete_in(CollectionKind::Labor, "missing").unwrap());
        assert_eq!(store.data(), &before);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observers_see_each_committed_document() {
        let (mut store, _) = new_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        store.subscribe(move |data| {
            counter.store(data.animals.len(), Ordering::SeqCst);
        });

        store.add(NewAnimal::new("A", "Cow")).unwrap();
        store.add(NewAnimal::new("B", "Cow")).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        // Rejected mutation: no notification
        assert!(store.add(NewAnimal::new("", "Cow")).is_err());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_animal_status_is_free_form() {
        let (mut store, _) = seeded_store();
        let id = store.animals()[0].id.clone();

        assert!(store.set_animal_status(&id, AnimalStatus::Sold).unwrap());
        assert!(store.set_animal_status(&id, AnimalStatus::Healthy).unwrap());
        assert_eq!(store.animals()[0].status, AnimalStatus::Healthy);

        assert!(!store.set_animal_status("missing", AnimalStatus::Sick).unwrap());
    }

    #[test]
    fn test_delete_in_dispatches_by_kind() {
        let (mut store, _) = seeded_store();
        let labor_id = store.labor()[0].id.clone();

        assert!(!store.delete_in(CollectionKind::Animals, &labor_id).unwrap());
        assert!(store.delete_in(CollectionKind::Labor, &labor_id).unwrap());
        assert!(store.labor().is_empty());
        assert_eq!(store.animals().len(), 2);
    }

    #[test]
    fn test_list_is_generic_read() {
        let (store, _) = seeded_store();
        assert_eq!(store.list::<Animal>().len(), 2);
        assert_eq!(store.list::<HealthRecord>(), store.health_records());
        assert_eq!(store.list::<FinancialEntry>(), store.finances());
        assert_eq!(store.list::<LaborRecord>(), store.labor());
    }

    #[test]
    fn test_replace_collection_leaves_others_equal() {
        let (mut store, _) = seeded_store();
        let before = store.data().clone();

        store.replace_collection(CollectionUpdate::Labor(Vec::new())).unwrap();

        let after = store.data();
        assert!(after.labor.is_empty());
        assert_eq!(after.animals, before.animals);
        assert_eq!(after.health_records, before.health_records);
        assert_eq!(after.finances, before.finances);
    }

    // ------------------------------------------------------------------------
    // Property tests
    // ------------------------------------------------------------------------

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (730_000i32..740_000).prop_map(|days| NaiveDate::from_num_days_from_ce_opt(days).unwrap())
    }

    fn arb_amount() -> impl Strategy<Value = f64> {
        // Quarter units keep every value exactly representable
        (0u32..400_000).prop_map(|quarters| f64::from(quarters) / 4.0)
    }

    fn arb_status() -> impl Strategy<Value = AnimalStatus> {
        prop::sample::select(AnimalStatus::ALL.to_vec())
    }

    fn arb_farm() -> impl Strategy<Value = FarmData> {
        let animals = prop::collection::vec(
            ("[a-z0-9-]{1,12}", "\\PC{0,12}", "[A-Za-z]{0,8}", arb_status(), arb_date()).prop_map(
                |(id, name, species, status, entry_date)| Animal {
                    id,
                    name,
                    species,
                    status,
                    entry_date,
                },
            ),
            0..5,
        );
        let health = prop::collection::vec(
            ("[a-z0-9]{1,8}", "[a-z0-9]{1,8}", "\\PC{0,12}", arb_amount(), arb_date()).prop_map(
                |(id, animal_id, symptoms, cost, date)| HealthRecord {
                    id,
                    animal_id,
                    symptoms,
                    treatment: String::new(),
                    cost,
                    date,
                },
            ),
            0..5,
        );
        let finances = prop::collection::vec(
            ("[a-z0-9]{1,8}", any::<bool>(), "[A-Za-z ]{0,10}", arb_amount(), arb_date()).prop_map(
                |(id, income, category, amount, date)| FinancialEntry {
                    id,
                    entry_type: if income {
                        crate::entities::EntryType::Income
                    } else {
                        crate::entities::EntryType::Expense
                    },
                    category,
                    amount,
                    description: "note".to_string(),
                    date,
                },
            ),
            0..5,
        );
        let labor = prop::collection::vec(
            ("[a-z0-9]{1,8}", "[A-Za-z]{1,8}", arb_date(), arb_amount(), arb_amount()).prop_map(
                |(id, worker_name, date, hours, wage)| LaborRecord {
                    id,
                    worker_name,
                    date,
                    hours,
                    wage,
                    task: "Feeding".to_string(),
                },
            ),
            0..5,
        );

        (animals, health, finances, labor).prop_map(|(animals, health_records, finances, labor)| {
            FarmData {
                animals,
                health_records,
                finances,
                labor,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_persist_then_load_round_trips(data in arb_farm()) {
            let mut storage = MemoryStorage::new();
            FarmStore::persist(&mut storage, STORAGE_KEY, &data).unwrap();
            prop_assert_eq!(FarmStore::load(&storage, STORAGE_KEY), data);
        }

        #[test]
        fn prop_replace_one_collection_keeps_the_rest(data in arb_farm(), other in arb_farm()) {
            let mut store = FarmStore::open(MemoryStorage::with_entry(STORAGE_KEY, &data.to_json().unwrap()));
            prop_assert_eq!(store.data(), &data);

            store.replace_collection(CollectionUpdate::Finances(other.finances.clone())).unwrap();

            prop_assert_eq!(&store.data().finances, &other.finances);
            prop_assert_eq!(&store.data().animals, &data.animals);
            prop_assert_eq!(&store.data().health_records, &data.health_records);
            prop_assert_eq!(&store.data().labor, &data.labor);
        }
    }
}
