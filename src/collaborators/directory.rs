//! Employee lookups used to label and filter payroll output.

use dashmap::DashMap;

use crate::models::{Employee, EmployeeId};

/// Read access to employee master data.
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee.
    fn get(&self, employee_id: EmployeeId) -> Option<Employee>;
}

/// Employee master data held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: DashMap<EmployeeId, Employee>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `employees`.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let directory = Self::new();
        for employee in employees {
            directory.upsert(employee);
        }
        directory
    }

    /// Adds or replaces an employee.
    pub fn upsert(&self, employee: Employee) {
        self.employees.insert(employee.id, employee);
    }

    /// Number of known employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Returns true if no employee is known.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn get(&self, employee_id: EmployeeId) -> Option<Employee> {
        self.employees.get(&employee_id).map(|e| e.value().clone())
    }
}
