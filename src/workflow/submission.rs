//! Inbound request payloads and their boundary validation.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::limits::{
    MAX_PROOF_LEN, MAX_REASON_LEN, MAX_REVIEW_NOTE_LEN, MAX_TASK_DESCRIPTION_LEN, optional_text,
    require_text,
};
use crate::models::{
    LateDetails, LeaveDetails, LeaveType, OvertimeDetails, RequestPayload, ReviewAction,
};

/// Overtime claim as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSubmission {
    /// The day the overtime was worked.
    pub work_date: NaiveDate,
    /// When the employee actually left on `work_date`.
    pub actual_check_out_time: NaiveTime,
    /// Hours claimed.
    pub overtime_hours: Decimal,
    /// Why the overtime was needed.
    pub reason: String,
    /// What was worked on.
    #[serde(default)]
    pub task_description: Option<String>,
    /// Reference to a supporting document.
    #[serde(default)]
    pub proof_reference: Option<String>,
}

/// Leave application as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSubmission {
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Days requested; defaults to the inclusive calendar-day count.
    #[serde(default)]
    pub total_days: Option<Decimal>,
    /// Why leave is requested.
    pub reason: String,
    /// Reference to a supporting document.
    #[serde(default)]
    pub proof_reference: Option<String>,
}

/// Late-arrival notice as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateSubmission {
    /// The day the employee will be late.
    pub request_date: NaiveDate,
    /// When the employee expects to arrive.
    pub expected_arrival_time: NaiveTime,
    /// Why the employee will be late.
    pub reason: String,
    /// Reference to a supporting document.
    #[serde(default)]
    pub proof_reference: Option<String>,
}

/// Any of the three submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Submission {
    /// An overtime claim.
    Overtime(OvertimeSubmission),
    /// A leave application.
    Leave(LeaveSubmission),
    /// A late-arrival notice.
    Late(LateSubmission),
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    /// Variant-specific content.
    pub payload: RequestPayload,
    /// Trimmed reason.
    pub reason: String,
    /// Trimmed proof reference.
    pub proof_reference: Option<String>,
}

impl Submission {
    /// Validates the required fields of the variant and normalises free text.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::workflow::{LateSubmission, Submission};
    /// use chrono::{NaiveDate, NaiveTime};
    ///
    /// let submission = Submission::Late(LateSubmission {
    ///     request_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
    ///     expected_arrival_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
    ///     reason: "  ".to_string(),
    ///     proof_reference: None,
    /// });
    /// assert!(submission.validate().is_err());
    /// ```
    pub fn validate(self) -> EngineResult<ValidatedSubmission> {
        match self {
            Submission::Overtime(ot) => {
                if ot.overtime_hours <= Decimal::ZERO {
                    return Err(EngineError::validation(
                        "overtime_hours",
                        "must be greater than zero",
                    ));
                }
                let task_description = optional_text(
                    "task_description",
                    ot.task_description.as_deref(),
                    MAX_TASK_DESCRIPTION_LEN,
                )?;
                Ok(ValidatedSubmission {
                    reason: require_text("reason", &ot.reason, MAX_REASON_LEN)?,
                    proof_reference: proof(ot.proof_reference.as_deref())?,
                    payload: RequestPayload::Overtime(OvertimeDetails {
                        work_date: ot.work_date,
                        actual_check_out_time: ot.work_date.and_time(ot.actual_check_out_time),
                        overtime_hours: ot.overtime_hours,
                        task_description,
                        approved_hours: None,
                    }),
                })
            }
            Submission::Leave(leave) => {
                if leave.end_date < leave.start_date {
                    return Err(EngineError::validation(
                        "end_date",
                        format!(
                            "end date {} is before start date {}",
                            leave.end_date, leave.start_date
                        ),
                    ));
                }
                let calendar_days = (leave.end_date - leave.start_date).num_days() + 1;
                let total_days = leave
                    .total_days
                    .unwrap_or_else(|| Decimal::from(calendar_days));
                if total_days <= Decimal::ZERO {
                    return Err(EngineError::validation(
                        "total_days",
                        "must be greater than zero",
                    ));
                }
                Ok(ValidatedSubmission {
                    reason: require_text("reason", &leave.reason, MAX_REASON_LEN)?,
                    proof_reference: proof(leave.proof_reference.as_deref())?,
                    payload: RequestPayload::Leave(LeaveDetails {
                        leave_type: leave.leave_type,
                        start_date: leave.start_date,
                        end_date: leave.end_date,
                        total_days,
                    }),
                })
            }
            Submission::Late(late) => Ok(ValidatedSubmission {
                reason: require_text("reason", &late.reason, MAX_REASON_LEN)?,
                proof_reference: proof(late.proof_reference.as_deref())?,
                payload: RequestPayload::Late(LateDetails {
                    request_date: late.request_date,
                    expected_arrival_time: late.expected_arrival_time,
                }),
            }),
        }
    }
}

fn proof(value: Option<&str>) -> EngineResult<Option<String>> {
    optional_text("proof_reference", value, MAX_PROOF_LEN)
}

/// An admin's decision on a pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    /// Approve or reject.
    pub action: ReviewAction,
    /// Optional note to the employee.
    #[serde(default)]
    pub note: Option<String>,
    /// Overtime hours to grant instead of the claimed hours.
    #[serde(default)]
    pub approved_hours: Option<Decimal>,
}

impl ReviewDecision {
    /// An approval without note or hour override.
    pub fn approve() -> Self {
        Self {
            action: ReviewAction::Approve,
            note: None,
            approved_hours: None,
        }
    }

    /// A rejection with the given note.
    pub fn reject(note: impl Into<String>) -> Self {
        Self {
            action: ReviewAction::Reject,
            note: Some(note.into()),
            approved_hours: None,
        }
    }

    /// Returns the trimmed note after bounding its length and checking the override.
    pub(crate) fn validate(&self) -> EngineResult<Option<String>> {
        if let Some(hours) = self.approved_hours {
            if self.action != ReviewAction::Approve {
                return Err(EngineError::validation(
                    "approved_hours",
                    "only applies to an approval",
                ));
            }
            if hours <= Decimal::ZERO {
                return Err(EngineError::validation(
                    "approved_hours",
                    "must be greater than zero",
                ));
            }
        }
        optional_text("note", self.note.as_deref(), MAX_REVIEW_NOTE_LEN)
    }
}
