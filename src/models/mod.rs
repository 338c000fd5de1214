//! Core data models for the attendance engine.
//!
//! This module contains the domain models shared by the attendance tracker,
//! the request workflow engine and the payroll engine.

mod actor;
mod attendance;
mod audit;
mod employee;
pub mod limits;
mod payroll;
mod request;

pub use actor::{ActorContext, Role};
pub use attendance::{Attendance, Checkpoint, EvidenceRef, GeoPoint};
pub use audit::{AuditAction, AuditEntry};
pub use employee::{Department, Employee};
pub use payroll::{DateRange, PayrollLine, PayrollQuery, PayrollReport};
pub use request::{
    LateDetails, LeaveDetails, LeaveType, OvertimeDetails, Request, RequestKind, RequestPayload,
    RequestStatus, Review, ReviewAction,
};

/// Identifier of an employee (also the identifier of an acting user).
pub type EmployeeId = u32;

/// Identifier of a department.
pub type DepartmentId = u32;

/// Identifier of an attendance row.
pub type AttendanceId = u64;

/// Identifier of an overtime, leave or late request.
pub type RequestId = u64;
