//! Attendance rows keyed by (employee, workday).

use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Attendance, AttendanceId, DateRange, EmployeeId};

/// Holds at most one [`Attendance`] per employee per day.
///
/// Every mutation runs under the shard lock of its key, so concurrent
/// check-ins for the same day serialize and exactly one of them inserts.
#[derive(Debug)]
pub struct AttendanceStore {
    rows: DashMap<(EmployeeId, NaiveDate), Attendance>,
    next_id: AtomicU64,
}

impl Default for AttendanceStore {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl AttendanceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh row id.
    pub fn next_id(&self) -> AttendanceId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns a copy of the row for the given employee and day.
    pub fn get(&self, employee_id: EmployeeId, work_date: NaiveDate) -> Option<Attendance> {
        self.rows
            .get(&(employee_id, work_date))
            .map(|row| row.value().clone())
    }

    /// Inserts `row` unless its key is taken.
    ///
    /// On conflict the existing row is returned unchanged in `Err`.
    pub fn insert_new(&self, row: Attendance) -> Result<Attendance, Attendance> {
        match self.rows.entry((row.employee_id, row.work_date)) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => Ok(slot.insert(row).value().clone()),
        }
    }

    /// Runs `f` on the row while holding its lock.
    ///
    /// Returns `None` when no row exists for the key.
    pub fn modify<T>(
        &self,
        employee_id: EmployeeId,
        work_date: NaiveDate,
        f: impl FnOnce(&mut Attendance) -> T,
    ) -> Option<T> {
        self.rows
            .get_mut(&(employee_id, work_date))
            .map(|mut row| f(row.value_mut()))
    }

    /// All rows of one employee, newest workday first.
    pub fn for_employee(&self, employee_id: EmployeeId) -> Vec<Attendance> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|row| row.employee_id == employee_id)
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.work_date.cmp(&a.work_date));
        rows
    }

    /// Every row whose workday falls in `range`, ordered by day then employee.
    pub fn in_range(&self, range: DateRange) -> Vec<Attendance> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|row| range.contains(row.work_date))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by_key(|row| (row.work_date, row.employee_id));
        rows
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn row(store: &AttendanceStore, employee_id: EmployeeId, d: u32) -> Attendance {
        Attendance::new(
            store.next_id(),
            employee_id,
            date(d),
            date(d).and_hms_opt(8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_insert_new_rejects_second_row_for_same_day() {
        let store = AttendanceStore::new();
        let first = store.insert_new(row(&store, 1, 3)).unwrap();
        let conflict = store.insert_new(row(&store, 1, 3)).unwrap_err();

        assert_eq!(conflict.attendance_id, first.attendance_id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_modify_missing_row_returns_none() {
        let store = AttendanceStore::new();
        assert!(store.modify(1, date(3), |r| r.is_late = true).is_none());
    }

    #[test]
    fn test_in_range_is_inclusive_and_ordered() {
        let store = AttendanceStore::new();
        for (emp, d) in [(2, 5), (1, 5), (1, 1), (1, 30)] {
            store.insert_new(row(&store, emp, d)).unwrap();
        }

        let range = DateRange::new(date(1), date(5)).unwrap();
        let keys: Vec<_> = store
            .in_range(range)
            .iter()
            .map(|r| (r.employee_id, r.work_date.day()))
            .collect();
        assert_eq!(keys, vec![(1, 1), (1, 5), (2, 5)]);
    }

    #[test]
    fn test_for_employee_is_newest_first() {
        let store = AttendanceStore::new();
        for d in [3, 10, 7] {
            store.insert_new(row(&store, 4, d)).unwrap();
        }
        let days: Vec<_> = store.for_employee(4).iter().map(|r| r.work_date).collect();
        assert_eq!(days, vec![date(10), date(7), date(3)]);
    }
}
