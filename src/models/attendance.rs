//! Attendance model and related types.
//!
//! One [`Attendance`] row exists per employee per workday. It is created by
//! check-in, closed by check-out and later adjusted when a late or overtime
//! request for the same day is approved.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AttendanceId, EmployeeId, RequestId};

/// A latitude/longitude pair as reported by the client device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: Decimal,
    /// Longitude in decimal degrees.
    pub longitude: Decimal,
}

impl GeoPoint {
    /// Creates a new point.
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The textual address used when reverse geocoding is unavailable.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::GeoPoint;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let point = GeoPoint::new(
    ///     Decimal::from_str("10.7769").unwrap(),
    ///     Decimal::from_str("106.7009").unwrap(),
    /// );
    /// assert_eq!(point.fallback_address(), "Lat: 10.776900, Long: 106.700900");
    /// ```
    pub fn fallback_address(&self) -> String {
        format!("Lat: {:.6}, Long: {:.6}", self.latitude, self.longitude)
    }
}

/// Opaque reference to a stored photo, as returned by the evidence store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceRef(pub String);

impl std::fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where and how one side of the workday (check-in or check-out) was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Reported device location.
    pub location: GeoPoint,
    /// Reverse-geocoded address, or the coordinate fallback.
    pub address: String,
    /// Stored photo evidence.
    pub evidence: EvidenceRef,
    /// Free-text note supplied by the employee.
    pub notes: Option<String>,
    /// Whether the location was inside the configured work-site boundary.
    pub within_geofence: bool,
}

/// Represents one employee's attendance on one workday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier for the row.
    pub attendance_id: AttendanceId,
    /// The employee the row belongs to.
    pub employee_id: EmployeeId,
    /// The workday (no time component).
    pub work_date: NaiveDate,
    /// When the employee checked in.
    pub check_in_time: Option<NaiveDateTime>,
    /// When the employee checked out.
    pub check_out_time: Option<NaiveDateTime>,
    /// Details recorded at check-in.
    pub check_in: Option<Checkpoint>,
    /// Details recorded at check-out.
    pub check_out: Option<Checkpoint>,
    /// Whether check-in happened after the standard check-in time.
    pub is_late: bool,
    /// Whether the check-in location was inside the geofence.
    pub is_within_geofence: bool,
    /// Hours between check-in and check-out, set once at check-out.
    pub total_hours: Option<Decimal>,
    /// Hours deducted from payable time by the lateness policy.
    pub deduction_hours: Decimal,
    /// Whether an overtime request for this day has been approved.
    pub is_overtime_approved: bool,
    /// Overtime hours granted by the approved request.
    pub approved_overtime_hours: Decimal,
    /// Whether a late request was ever linked to this day.
    pub has_late_request: bool,
    /// The most recently linked late request.
    pub late_request_id: Option<RequestId>,
    /// Whether an overtime request was ever linked to this day.
    pub has_overtime_request: bool,
    /// The most recently linked overtime request.
    pub overtime_request_id: Option<RequestId>,
    /// When the row was created.
    pub created_at: NaiveDateTime,
    /// When the row was last changed.
    pub updated_at: NaiveDateTime,
}

impl Attendance {
    /// Builds an empty row for the given employee and day.
    pub fn new(
        attendance_id: AttendanceId,
        employee_id: EmployeeId,
        work_date: NaiveDate,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            attendance_id,
            employee_id,
            work_date,
            check_in_time: None,
            check_out_time: None,
            check_in: None,
            check_out: None,
            is_late: false,
            is_within_geofence: true,
            total_hours: None,
            deduction_hours: Decimal::ZERO,
            is_overtime_approved: false,
            approved_overtime_hours: Decimal::ZERO,
            has_late_request: false,
            late_request_id: None,
            has_overtime_request: false,
            overtime_request_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the employee has checked in but not yet out.
    pub fn is_open(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_none()
    }

    /// Returns `true` once both check-in and check-out are recorded.
    pub fn is_completed(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_some()
    }

    /// Records the check-out side of the day and derives `total_hours`.
    ///
    /// The caller guarantees the row is open and `time` is not before check-in.
    pub(crate) fn close(&mut self, time: NaiveDateTime, checkpoint: Checkpoint) {
        self.check_out_time = Some(time);
        self.check_out = Some(checkpoint);
        if let Some(check_in) = self.check_in_time {
            self.total_hours = Some(hours_between(check_in, time));
        }
        self.updated_at = time;
    }

    /// Applies an approved overtime request. Replaces any earlier approval.
    pub(crate) fn approve_overtime(
        &mut self,
        request_id: RequestId,
        hours: Decimal,
        now: NaiveDateTime,
    ) {
        self.is_overtime_approved = true;
        self.approved_overtime_hours = hours;
        self.has_overtime_request = true;
        self.overtime_request_id = Some(request_id);
        self.updated_at = now;
    }

    pub(crate) fn link_overtime_request(&mut self, request_id: RequestId, now: NaiveDateTime) {
        self.has_overtime_request = true;
        self.overtime_request_id = Some(request_id);
        self.updated_at = now;
    }

    pub(crate) fn link_late_request(&mut self, request_id: RequestId, now: NaiveDateTime) {
        self.has_late_request = true;
        self.late_request_id = Some(request_id);
        self.updated_at = now;
    }
}

/// Exact decimal hours between two instants, computed from whole seconds.
pub(crate) fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    let seconds = (end - start).num_seconds();
    Decimal::from(seconds) / Decimal::from(3600)
}
