//! Request models for the overtime, leave and late workflows.
//!
//! All three variants share one [`Request`] envelope and one status machine;
//! only the [`RequestPayload`] differs.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeId, RequestId};
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a request.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Submitted and awaiting review.
    Pending,
    /// Approved by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
    /// Withdrawn by the owning employee.
    Cancelled,
}

impl RequestStatus {
    /// Returns true for Approved, Rejected and Cancelled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "Pending"),
            RequestStatus::Approved => write!(f, "Approved"),
            RequestStatus::Rejected => write!(f, "Rejected"),
            RequestStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// The three request variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Overtime worked on a single day.
    Overtime,
    /// Leave over a date range.
    Leave,
    /// Expected late arrival on a single day.
    Late,
}

impl RequestKind {
    /// The entity name used in audit entries.
    pub fn entity_type(&self) -> &'static str {
        match self {
            RequestKind::Overtime => "OvertimeRequest",
            RequestKind::Leave => "LeaveRequest",
            RequestKind::Late => "LateRequest",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Overtime => write!(f, "Overtime"),
            RequestKind::Leave => write!(f, "Leave"),
            RequestKind::Late => write!(f, "Late"),
        }
    }
}

impl std::str::FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overtime" => Ok(RequestKind::Overtime),
            "leave" => Ok(RequestKind::Leave),
            "late" => Ok(RequestKind::Late),
            _ => Err(format!("Invalid request type: {}", s)),
        }
    }
}

/// Category of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid annual leave.
    Annual,
    /// Sick leave.
    Sick,
    /// Unpaid leave.
    Unpaid,
    /// Anything else.
    Other,
}

/// Overtime claimed for one workday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeDetails {
    /// The workday the overtime was worked on.
    pub work_date: NaiveDate,
    /// When the employee actually left.
    pub actual_check_out_time: NaiveDateTime,
    /// Hours claimed by the employee.
    pub overtime_hours: Decimal,
    /// What was worked on.
    #[serde(default)]
    pub task_description: Option<String>,
    /// Hours granted by the reviewer when they differ from the claim.
    #[serde(default)]
    pub approved_hours: Option<Decimal>,
}

impl OvertimeDetails {
    /// Hours that count for payroll once approved.
    pub fn effective_hours(&self) -> Decimal {
        self.approved_hours.unwrap_or(self.overtime_hours)
    }
}

/// Leave over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDetails {
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Number of days requested; may be fractional.
    pub total_days: Decimal,
}

/// Notice of a late arrival on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateDetails {
    /// The day the employee will be late.
    pub request_date: NaiveDate,
    /// When the employee expects to arrive.
    pub expected_arrival_time: NaiveTime,
}

/// Variant-specific content of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestPayload {
    /// An overtime claim.
    Overtime(OvertimeDetails),
    /// A leave application.
    Leave(LeaveDetails),
    /// A late-arrival notice.
    Late(LateDetails),
}

impl RequestPayload {
    /// Returns the variant tag.
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestPayload::Overtime(_) => RequestKind::Overtime,
            RequestPayload::Leave(_) => RequestKind::Leave,
            RequestPayload::Late(_) => RequestKind::Late,
        }
    }

    /// The single workday an overtime or late request refers to.
    ///
    /// Leave spans a range and has no anchor day.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        match self {
            RequestPayload::Overtime(ot) => Some(ot.work_date),
            RequestPayload::Late(late) => Some(late.request_date),
            RequestPayload::Leave(_) => None,
        }
    }

    /// Returns true if the request's dates intersect the optional window.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::{LeaveDetails, LeaveType, RequestPayload};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
    /// let leave = RequestPayload::Leave(LeaveDetails {
    ///     leave_type: LeaveType::Annual,
    ///     start_date: d(3),
    ///     end_date: d(7),
    ///     total_days: Decimal::from(5),
    /// });
    ///
    /// assert!(leave.overlaps(Some(d(6)), Some(d(10))));
    /// assert!(leave.overlaps(None, Some(d(3))));
    /// assert!(!leave.overlaps(Some(d(8)), None));
    /// ```
    pub fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let (start, end) = match self {
            RequestPayload::Leave(leave) => (leave.start_date, leave.end_date),
            RequestPayload::Overtime(ot) => (ot.work_date, ot.work_date),
            RequestPayload::Late(late) => (late.request_date, late.request_date),
        };
        from.is_none_or(|from| end >= from) && to.is_none_or(|to| start <= to)
    }
}

/// Reviewer's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Approve the request.
    Approve,
    /// Reject the request.
    Reject,
}

/// Reviewer stamp recorded when a request is approved or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// The admin who reviewed.
    pub reviewer_id: EmployeeId,
    /// When the review happened.
    pub reviewed_at: NaiveDateTime,
    /// Optional note from the reviewer.
    pub note: Option<String>,
}

/// An overtime, leave or late request and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier for the request.
    pub request_id: RequestId,
    /// The employee who submitted the request and owns it.
    pub employee_id: EmployeeId,
    /// Variant-specific content.
    pub payload: RequestPayload,
    /// Why the request was made.
    pub reason: String,
    /// Reference to an uploaded supporting document.
    pub proof_reference: Option<String>,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Reviewer stamp, present once approved or rejected.
    pub review: Option<Review>,
    /// Incremented on every state change.
    pub version: u32,
    /// When the request was submitted.
    pub created_at: NaiveDateTime,
    /// When the request last changed.
    pub updated_at: NaiveDateTime,
}

impl Request {
    /// Returns the variant tag.
    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }

    /// Returns true if `employee_id` submitted this request.
    pub fn is_owned_by(&self, employee_id: EmployeeId) -> bool {
        self.employee_id == employee_id
    }

    /// Case-insensitive search over reason, task description and proof reference.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        let task = match &self.payload {
            RequestPayload::Overtime(ot) => ot.task_description.as_deref(),
            _ => None,
        };
        [Some(self.reason.as_str()), task, self.proof_reference.as_deref()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&keyword))
    }

    /// Moves a pending request into a terminal state.
    ///
    /// Fails with `NotPending` when the request has already been settled, which
    /// keeps every terminal state absorbing.
    pub(crate) fn settle(
        &mut self,
        status: RequestStatus,
        review: Option<Review>,
        now: NaiveDateTime,
    ) -> EngineResult<()> {
        if self.status != RequestStatus::Pending {
            return Err(EngineError::NotPending {
                request_id: self.request_id,
                status: self.status,
            });
        }
        self.status = status;
        if review.is_some() {
            self.review = review;
        }
        self.version += 1;
        self.updated_at = now;
        Ok(())
    }
}
