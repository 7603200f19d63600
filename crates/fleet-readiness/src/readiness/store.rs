use super::ranking::RankedRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Destination for ranked nights.
pub trait RecordStore: Send + Sync {
    fn append_night(&self, date: NaiveDate, records: Vec<RankedRecord>)
        -> Result<(), StoreError>;
    fn night(&self, date: NaiveDate) -> Result<Option<Vec<RankedRecord>>, StoreError>;
    /// Every stored record, ordered by date and then by rank.
    fn records(&self) -> Result<Vec<RankedRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("night {0} already stored")]
    Conflict(NaiveDate),
    #[error("record for {found} submitted as part of night {expected}")]
    MixedNight {
        expected: NaiveDate,
        found: NaiveDate,
    },
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Keeps nights in memory keyed by date.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    nights: Arc<Mutex<BTreeMap<NaiveDate, Vec<RankedRecord>>>>,
}

impl InMemoryRecordStore {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<NaiveDate, Vec<RankedRecord>>>, StoreError>
    {
        self.nights
            .lock()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append_night(
        &self,
        date: NaiveDate,
        records: Vec<RankedRecord>,
    ) -> Result<(), StoreError> {
        if let Some(stray) = records
            .iter()
            .find(|ranked| ranked.record.signals.date != date)
        {
            return Err(StoreError::MixedNight {
                expected: date,
                found: stray.record.signals.date,
            });
        }

        let mut guard = self.lock()?;
        if guard.contains_key(&date) {
            return Err(StoreError::Conflict(date));
        }
        guard.insert(date, records);
        Ok(())
    }

    fn night(&self, date: NaiveDate) -> Result<Option<Vec<RankedRecord>>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(&date).cloned())
    }

    fn records(&self) -> Result<Vec<RankedRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.values().flatten().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readiness::derivation::DerivationEngine;
    use crate::readiness::domain::fixtures::{healthy_bundle, night};
    use crate::readiness::ranking::FleetRanker;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ranked_night(date: NaiveDate) -> Vec<RankedRecord> {
        let engine = DerivationEngine::default();
        let mut rng = StdRng::seed_from_u64(1);
        let records = (0..3)
            .map(|_| {
                let mut bundle = healthy_bundle();
                bundle.date = date;
                engine.derive(bundle, &mut rng)
            })
            .collect();
        FleetRanker.rank(records)
    }

    #[test]
    fn stores_nights_in_date_order() {
        let store = InMemoryRecordStore::default();
        let later = night() + chrono::Duration::days(1);

        store
            .append_night(later, ranked_night(later))
            .expect("later night stored");
        store
            .append_night(night(), ranked_night(night()))
            .expect("earlier night stored");

        let records = store.records().expect("records readable");
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].record.signals.date, night());
        assert_eq!(records[5].record.signals.date, later);
        assert_eq!(
            store.night(later).expect("readable").map(|night| night.len()),
            Some(3)
        );
        assert!(store
            .night(later + chrono::Duration::days(1))
            .expect("readable")
            .is_none());
    }

    #[test]
    fn rejects_duplicate_nights() {
        let store = InMemoryRecordStore::default();
        store
            .append_night(night(), ranked_night(night()))
            .expect("first insert");

        match store.append_night(night(), ranked_night(night())) {
            Err(StoreError::Conflict(date)) => assert_eq!(date, night()),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn rejects_records_from_another_night() {
        let store = InMemoryRecordStore::default();
        let other = night() + chrono::Duration::days(3);

        let error = store
            .append_night(night(), ranked_night(other))
            .expect_err("mixed night rejected");
        assert!(matches!(error, StoreError::MixedNight { .. }));
    }
}
