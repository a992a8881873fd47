//! Fixed-capacity record arena.

use crate::error::ArenaError;

/// An append-only array of `T` with a capacity fixed at creation.
///
/// Storage is reserved once and never reallocated, so records never move.
/// There is no removal; [`reset`](TableArena::reset) drops every record.
pub struct TableArena<T> {
    name: &'static str,
    records: Vec<T>,
    capacity: usize,
}

impl<T> TableArena<T> {
    /// Reserve room for `capacity` records.
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore a table from persisted records.
    ///
    /// The capacity is the larger of `capacity` and `records.len()`, so
    /// every restored record fits.
    pub fn from_records(
        name: &'static str,
        records: impl IntoIterator<Item = T>,
        capacity: usize,
    ) -> Self {
        let records: Vec<T> = records.into_iter().collect();
        let capacity = capacity.max(records.len());
        let mut table = Self::with_capacity(name, capacity);
        table.records.extend(records);
        table
    }

    /// Append a record and return its index.
    pub fn push(&mut self, record: T) -> Result<u32, ArenaError> {
        if self.records.len() >= self.capacity {
            return Err(ArenaError::CapacityExceeded {
                arena: self.name,
                requested: 1,
                used: self.records.len(),
                capacity: self.capacity,
            });
        }
        let index = self.records.len() as u32;
        self.records.push(record);
        Ok(index)
    }

    /// Record at `index`, if present.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.records.get(index as usize)
    }

    /// First record matching `pred`, scanning in insertion order.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.records.iter().find(|r| pred(r))
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// All records as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    /// Drop every record, keeping the reservation.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Name given at creation, used in error reports.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<'a, T> IntoIterator for &'a TableArena<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
