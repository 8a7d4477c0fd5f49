use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{AvailabilityRecord, TimeSlotLabel};

/// Open slots per date, in the order the backend listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityIndex {
    by_date: BTreeMap<NaiveDate, Vec<TimeSlotLabel>>,
}

impl AvailabilityIndex {
    /// When a date appears twice, the first record wins.
    pub fn from_records(records: impl IntoIterator<Item = AvailabilityRecord>) -> Self {
        let mut by_date = BTreeMap::new();
        for record in records {
            if by_date.contains_key(&record.date) {
                debug!("Ignoring repeated availability for {}", record.date);
                continue;
            }
            by_date.insert(record.date, record.time_slots);
        }
        Self { by_date }
    }

    pub fn slots_for(&self, date: NaiveDate) -> &[TimeSlotLabel] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A date counts as available once the backend lists it, even with no slots.
    pub fn has_record(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    pub fn contains_slot(&self, date: NaiveDate, label: &str) -> bool {
        self.slots_for(date).iter().any(|slot| slot.as_str() == label)
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
