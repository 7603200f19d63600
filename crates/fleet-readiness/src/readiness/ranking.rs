use super::derivation::DerivedRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A derived record once the whole night has been ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    pub record: DerivedRecord,
    /// Dense rank within the night; 1 is the most likely to be used.
    pub probability_rank: u32,
}

/// Orders one night's fleet by probability of use.
///
/// The sort is stable, so vehicles with identical probabilities keep the
/// order they were derived in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetRanker;

impl FleetRanker {
    pub fn rank(&self, mut records: Vec<DerivedRecord>) -> Vec<RankedRecord> {
        records.sort_by(by_probability_desc);

        records
            .into_iter()
            .zip(1u32..)
            .map(|(record, probability_rank)| RankedRecord {
                record,
                probability_rank,
            })
            .collect()
    }
}

fn by_probability_desc(a: &DerivedRecord, b: &DerivedRecord) -> Ordering {
    b.probability_of_use.total_cmp(&a.probability_of_use)
}
