//! Employee model and related types.
//!
//! This module defines the [`Employee`] and [`Department`] structs the
//! payroll engine uses to label and filter its output.

use serde::{Deserialize, Serialize};

use super::{DepartmentId, EmployeeId};

/// An organisational unit employees belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier for the department.
    pub id: DepartmentId,
    /// Display name of the department.
    pub name: String,
}

/// Represents an employee whose attendance is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// Display name used for ordering payroll output.
    pub full_name: String,
    /// The department the employee belongs to, if any.
    #[serde(default)]
    pub department: Option<Department>,
    /// Inactive employees are kept for history but hidden from listings.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Returns the printable employee code, e.g. `NV0005`.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::Employee;
    ///
    /// assert_eq!(Employee::code_for(5), "NV0005");
    /// assert_eq!(Employee::code_for(12345), "NV12345");
    /// ```
    pub fn code_for(id: EmployeeId) -> String {
        format!("NV{:04}", id)
    }

    /// Returns this employee's printable code.
    pub fn code(&self) -> String {
        Self::code_for(self.id)
    }

    /// Returns the department name or `N/A` when the employee has none.
    pub fn department_name(&self) -> &str {
        self.department
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("N/A")
    }

    /// Returns true if the employee belongs to the given department.
    pub fn in_department(&self, department_id: DepartmentId) -> bool {
        self.department
            .as_ref()
            .is_some_and(|d| d.id == department_id)
    }
}
