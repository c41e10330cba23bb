use std::collections::HashMap;

use crate::device::DeviceRecord;

/// Single-owner record set keyed by device name, iterated in insertion order.
///
/// Records are never removed. Stages that work concurrently take copies and hand them back
/// through [`Inventory::replace`].
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    records: Vec<DeviceRecord>,
    index: HashMap<String, usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record. A second record with the same name overwrites the first in place, keeping
    /// its original position.
    pub fn insert(&mut self, record: DeviceRecord) {
        match self.index.get(record.name()) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index
                    .insert(record.name().to_string(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Puts an updated copy of an existing record back. Returns `false` for unknown names.
    pub fn replace(&mut self, record: DeviceRecord) -> bool {
        match self.index.get(record.name()) {
            Some(&pos) => {
                self.records[pos] = record;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&DeviceRecord> {
        self.index.get(name).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DeviceRecord> {
        self.index.get(name).map(|&pos| &mut self.records[pos])
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DeviceRecord> for Inventory {
    fn from_iter<I: IntoIterator<Item = DeviceRecord>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for record in iter {
            inventory.insert(record);
        }
        inventory
    }
}
