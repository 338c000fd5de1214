//! Audit entries emitted on every state-changing operation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::EmployeeId;

/// What kind of change an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Employee checked in.
    CheckIn,
    /// Employee checked out.
    CheckOut,
    /// A request was submitted.
    Create,
    /// A request was approved or rejected.
    Review,
    /// A request was cancelled by its owner.
    Cancel,
    /// A payroll report was exported.
    Export,
}

/// One fire-and-forget audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Who performed the action.
    pub actor_id: EmployeeId,
    /// What happened.
    pub action: AuditAction,
    /// The entity name, e.g. `Attendance` or `OvertimeRequest`.
    pub entity_type: String,
    /// The entity id, if the action targets a single entity.
    pub entity_id: Option<u64>,
    /// The relevant fields before the change.
    pub old_value: Option<serde_json::Value>,
    /// The relevant fields after the change.
    pub new_value: Option<serde_json::Value>,
    /// Human-readable summary.
    pub description: String,
    /// Extra key/value context.
    pub metadata: Option<serde_json::Value>,
    /// When the action happened.
    pub recorded_at: NaiveDateTime,
}
