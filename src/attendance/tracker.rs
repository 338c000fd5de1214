//! The check-in/check-out state machine.
//!
//! Each (employee, workday) moves through three states:
//!
//! ```text
//! (no row) --check-in--> open --check-out--> completed
//! ```
//!
//! A second check-in or check-out is rejected with a distinct error, never
//! applied twice. Slow work (evidence storage, reverse geocoding) happens
//! before the row lock is taken, and the precondition is checked again
//! under the lock before the row is written.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::collaborators::{
    AuditSink, EvidenceStore, EvidenceUpload, ReverseGeocoder, resolve_address,
};
use crate::config::{AttendancePolicy, SettingsProvider};
use crate::error::{EngineError, EngineResult};
use crate::models::limits::{MAX_NOTES_LEN, optional_text};
use crate::models::{
    Attendance, AuditAction, AuditEntry, Checkpoint, DateRange, EmployeeId, GeoPoint,
};
use crate::store::AttendanceStore;

use super::deduction::{DeductionPolicy, FlatLateDeduction};
use super::evidence::{CheckpointSide, evidence_file_name, validate_evidence};
use super::geofence::is_within_geofence;

/// Largest page size accepted by [`AttendanceTracker::history`].
pub const MAX_PAGE_SIZE: usize = 100;

/// Input for a check-in or check-out.
#[derive(Debug, Clone)]
pub struct CheckpointCommand {
    /// Who is checking in or out.
    pub employee_id: EmployeeId,
    /// When it happened; its date is the workday.
    pub timestamp: NaiveDateTime,
    /// Photo evidence.
    pub evidence: Option<EvidenceUpload>,
    /// Reported device location.
    pub location: GeoPoint,
    /// Optional note.
    pub notes: Option<String>,
}

/// One page of an employee's attendance history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePage {
    /// Rows on this page, newest first.
    pub items: Vec<Attendance>,
    /// Total number of rows for the employee.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    /// Requested page size.
    pub page_size: usize,
}

/// Records check-ins and check-outs.
pub struct AttendanceTracker {
    store: Arc<AttendanceStore>,
    settings: Arc<dyn SettingsProvider>,
    evidence: Arc<dyn EvidenceStore>,
    geocoder: Arc<dyn ReverseGeocoder>,
    audit: Arc<dyn AuditSink>,
    deduction: Arc<dyn DeductionPolicy>,
}

impl AttendanceTracker {
    /// Creates a tracker deducting hours with [`FlatLateDeduction`].
    pub fn new(
        store: Arc<AttendanceStore>,
        settings: Arc<dyn SettingsProvider>,
        evidence: Arc<dyn EvidenceStore>,
        geocoder: Arc<dyn ReverseGeocoder>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            settings,
            evidence,
            geocoder,
            audit,
            deduction: Arc::new(FlatLateDeduction),
        }
    }

    /// Largest evidence upload the current settings accept, falling back to
    /// the default when the settings do not resolve.
    pub fn max_evidence_bytes(&self) -> usize {
        AttendancePolicy::resolve(self.settings.as_ref())
            .unwrap_or_default()
            .max_evidence_bytes
    }

    /// Replaces the deduction policy.
    pub fn with_deduction_policy(mut self, deduction: Arc<dyn DeductionPolicy>) -> Self {
        self.deduction = deduction;
        self
    }

    /// Records the start of a workday.
    ///
    /// # Errors
    ///
    /// * `AlreadyCheckedIn` - the day is open
    /// * `AlreadyCompleted` - the day has been checked out
    /// * `MissingEvidence`, `EvidenceTooLarge`, `UnsupportedEvidenceFormat`
    /// * `Validation` - notes too long
    pub async fn check_in(&self, command: CheckpointCommand) -> EngineResult<Attendance> {
        let policy = AttendancePolicy::resolve(self.settings.as_ref())?;
        let notes = optional_text("notes", command.notes.as_deref(), MAX_NOTES_LEN)?;
        let employee_id = command.employee_id;
        let work_date = command.timestamp.date();

        if let Some(existing) = self.store.get(employee_id, work_date) {
            return Err(check_in_conflict(&existing));
        }

        let extension = validate_evidence(command.evidence.as_ref(), &policy)?;
        let checkpoint = self
            .record_checkpoint(&command, CheckpointSide::CheckIn, &extension, notes, &policy)
            .await?;

        let is_late = command.timestamp.time() > policy.standard_check_in_time;
        let deduction_hours = self
            .deduction
            .deduction_hours(command.timestamp, is_late, &policy);

        let mut row = Attendance::new(
            self.store.next_id(),
            employee_id,
            work_date,
            command.timestamp,
        );
        row.check_in_time = Some(command.timestamp);
        row.is_late = is_late;
        row.is_within_geofence = checkpoint.within_geofence;
        row.deduction_hours = deduction_hours;
        row.check_in = Some(checkpoint);

        let row = self
            .store
            .insert_new(row)
            .map_err(|existing| check_in_conflict(&existing))?;

        info!(
            employee_id,
            work_date = %work_date,
            attendance_id = row.attendance_id,
            is_late,
            within_geofence = row.is_within_geofence,
            "Checked in"
        );
        self.audit.record(AuditEntry {
            actor_id: employee_id,
            action: AuditAction::CheckIn,
            entity_type: "Attendance".to_string(),
            entity_id: Some(row.attendance_id),
            old_value: None,
            new_value: Some(serde_json::json!({
                "check_in_time": command.timestamp,
                "is_late": is_late,
                "is_within_geofence": row.is_within_geofence,
                "deduction_hours": deduction_hours.normalize().to_string(),
                "address": row.check_in.as_ref().map(|c| c.address.clone()),
                "evidence": row.check_in.as_ref().map(|c| c.evidence.clone()),
            })),
            description: format!(
                "Check-in at {}{}",
                row.check_in.as_ref().map(|c| c.address.as_str()).unwrap_or(""),
                if is_late { " (late)" } else { "" }
            ),
            metadata: Some(serde_json::json!({
                "latitude": command.location.latitude.to_string(),
                "longitude": command.location.longitude.to_string(),
            })),
            recorded_at: command.timestamp,
        });

        Ok(row)
    }

    /// Records the end of a workday and derives the worked hours.
    ///
    /// # Errors
    ///
    /// * `NotCheckedIn` - no check-in for the day
    /// * `AlreadyCheckedOut` - the day is already closed
    /// * `Validation` - timestamp before check-in, or notes too long
    /// * evidence errors as for [`AttendanceTracker::check_in`]
    pub async fn check_out(&self, command: CheckpointCommand) -> EngineResult<Attendance> {
        let policy = AttendancePolicy::resolve(self.settings.as_ref())?;
        let notes = optional_text("notes", command.notes.as_deref(), MAX_NOTES_LEN)?;
        let employee_id = command.employee_id;
        let work_date = command.timestamp.date();

        let existing = self.store.get(employee_id, work_date);
        check_out_precondition(existing.as_ref(), employee_id, work_date, command.timestamp)?;

        let extension = validate_evidence(command.evidence.as_ref(), &policy)?;
        let checkpoint = self
            .record_checkpoint(&command, CheckpointSide::CheckOut, &extension, notes, &policy)
            .await?;

        let row = self
            .store
            .modify(employee_id, work_date, |row| {
                check_out_precondition(Some(row), employee_id, work_date, command.timestamp)?;
                row.close(command.timestamp, checkpoint);
                Ok(row.clone())
            })
            .unwrap_or_else(|| {
                Err(EngineError::NotCheckedIn {
                    employee_id,
                    work_date,
                })
            })?;

        let total_hours = row.total_hours.unwrap_or_default();
        info!(
            employee_id,
            work_date = %work_date,
            attendance_id = row.attendance_id,
            total_hours = %total_hours.round_dp(2),
            "Checked out"
        );
        self.audit.record(AuditEntry {
            actor_id: employee_id,
            action: AuditAction::CheckOut,
            entity_type: "Attendance".to_string(),
            entity_id: Some(row.attendance_id),
            old_value: None,
            new_value: Some(serde_json::json!({
                "check_out_time": command.timestamp,
                "total_hours": total_hours.normalize().to_string(),
                "address": row.check_out.as_ref().map(|c| c.address.clone()),
                "evidence": row.check_out.as_ref().map(|c| c.evidence.clone()),
            })),
            description: format!(
                "Check-out at {}, {}h worked",
                row.check_out.as_ref().map(|c| c.address.as_str()).unwrap_or(""),
                total_hours.round_dp(2)
            ),
            metadata: Some(serde_json::json!({
                "latitude": command.location.latitude.to_string(),
                "longitude": command.location.longitude.to_string(),
            })),
            recorded_at: command.timestamp,
        });

        Ok(row)
    }

    /// The employee's row for `date`, if any.
    pub fn today(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<Attendance> {
        self.store.get(employee_id, date)
    }

    /// One page of the employee's rows, newest first.
    pub fn history(
        &self,
        employee_id: EmployeeId,
        page: usize,
        page_size: usize,
    ) -> EngineResult<AttendancePage> {
        if page == 0 {
            return Err(EngineError::validation("page", "must be at least 1"));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(EngineError::validation(
                "page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        let rows = self.store.for_employee(employee_id);
        let total = rows.len();
        // a page past the addressable range is simply empty
        let offset = (page - 1).checked_mul(page_size).unwrap_or(usize::MAX);
        let items = rows
            .into_iter()
            .skip(offset)
            .take(page_size)
            .collect();

        Ok(AttendancePage {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Every row in `range`, as read by payroll.
    pub fn in_range(&self, range: DateRange) -> Vec<Attendance> {
        self.store.in_range(range)
    }

    async fn record_checkpoint(
        &self,
        command: &CheckpointCommand,
        side: CheckpointSide,
        extension: &str,
        notes: Option<String>,
        policy: &AttendancePolicy,
    ) -> EngineResult<Checkpoint> {
        let upload = command.evidence.as_ref().ok_or(EngineError::MissingEvidence)?;
        let file_name = evidence_file_name(command.employee_id, command.timestamp, side, extension);
        let evidence = self.evidence.save(&file_name, upload).await?;
        debug!(employee_id = command.employee_id, evidence = %evidence, "Stored evidence");

        let address = resolve_address(
            self.geocoder.as_ref(),
            command.location,
            policy.geocoder_timeout,
        )
        .await;

        Ok(Checkpoint {
            location: command.location,
            address,
            evidence,
            notes,
            within_geofence: is_within_geofence(policy.geofence.as_ref(), command.location),
        })
    }
}

fn check_in_conflict(existing: &Attendance) -> EngineError {
    if existing.check_out_time.is_some() {
        EngineError::AlreadyCompleted {
            employee_id: existing.employee_id,
            work_date: existing.work_date,
        }
    } else {
        EngineError::AlreadyCheckedIn {
            employee_id: existing.employee_id,
            work_date: existing.work_date,
        }
    }
}

fn check_out_precondition(
    existing: Option<&Attendance>,
    employee_id: EmployeeId,
    work_date: NaiveDate,
    timestamp: NaiveDateTime,
) -> EngineResult<()> {
    let Some(check_in_time) = existing.and_then(|row| row.check_in_time) else {
        return Err(EngineError::NotCheckedIn {
            employee_id,
            work_date,
        });
    };
    if existing.is_some_and(|row| row.check_out_time.is_some()) {
        return Err(EngineError::AlreadyCheckedOut {
            employee_id,
            work_date,
        });
    }
    if timestamp < check_in_time {
        return Err(EngineError::validation(
            "timestamp",
            format!("check-out {} is before check-in {}", timestamp, check_in_time),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{InMemoryAuditSink, InMemoryEvidenceStore, NoopGeocoder, StaticGeocoder};
    use crate::config::SettingsStore;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn office() -> GeoPoint {
        GeoPoint::new(dec("10.7769"), dec("106.7009"))
    }

    struct Fixture {
        tracker: AttendanceTracker,
        audit: Arc<InMemoryAuditSink>,
        evidence: Arc<InMemoryEvidenceStore>,
    }

    fn fixture_with(settings: SettingsStore, geocoder: Arc<dyn ReverseGeocoder>) -> Fixture {
        let audit = Arc::new(InMemoryAuditSink::new());
        let evidence = Arc::new(InMemoryEvidenceStore::new());
        let tracker = AttendanceTracker::new(
            Arc::new(AttendanceStore::new()),
            Arc::new(settings),
            evidence.clone(),
            geocoder,
            audit.clone(),
        );
        Fixture {
            tracker,
            audit,
            evidence,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(SettingsStore::with_defaults(), Arc::new(NoopGeocoder))
    }

    fn command(employee_id: EmployeeId, at: NaiveDateTime) -> CheckpointCommand {
        CheckpointCommand {
            employee_id,
            timestamp: at,
            evidence: Some(EvidenceUpload::new("photo.jpg", vec![0xFF, 0xD8, 0xFF])),
            location: office(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_on_time_check_in_creates_open_row() {
        let f = fixture();
        let row = f
            .tracker
            .check_in(command(5, make_datetime("2024-06-03", "07:58:00")))
            .await
            .unwrap();

        assert!(row.is_open());
        assert!(!row.is_late);
        assert!(row.is_within_geofence);
        assert_eq!(row.deduction_hours, Decimal::ZERO);
        let checkpoint = row.check_in.unwrap();
        assert_eq!(checkpoint.address, "Lat: 10.776900, Long: 106.700900");
        assert_eq!(
            checkpoint.evidence.0,
            "/uploads/attendance/5_20240603_075800_checkin.jpg"
        );
        assert_eq!(f.evidence.len(), 1);
        assert_eq!(f.audit.entries()[0].action, AuditAction::CheckIn);
    }

    #[tokio::test]
    async fn test_lateness_is_strictly_after_standard_time() {
        let f = fixture();
        let exactly = f
            .tracker
            .check_in(command(1, make_datetime("2024-06-03", "08:00:00")))
            .await
            .unwrap();
        let one_second_late = f
            .tracker
            .check_in(command(2, make_datetime("2024-06-03", "08:00:01")))
            .await
            .unwrap();

        assert!(!exactly.is_late);
        assert!(one_second_late.is_late);
    }

    #[tokio::test]
    async fn test_standard_time_comes_from_settings() {
        let settings = SettingsStore::with_defaults()
            .with_value("CHECK_IN_STANDARD_TIME", "09:00")
            .with_value("LATE_DEDUCTION_HOURS", "1.5");
        let f = fixture_with(settings, Arc::new(NoopGeocoder));

        let on_time = f
            .tracker
            .check_in(command(1, make_datetime("2024-06-03", "08:45:00")))
            .await
            .unwrap();
        let late = f
            .tracker
            .check_in(command(2, make_datetime("2024-06-03", "09:10:00")))
            .await
            .unwrap();

        assert!(!on_time.is_late);
        assert_eq!(on_time.deduction_hours, Decimal::ZERO);
        assert!(late.is_late);
        assert_eq!(late.deduction_hours, dec("1.5"));
    }

    #[tokio::test]
    async fn test_second_check_in_is_rejected() {
        let f = fixture();
        f.tracker
            .check_in(command(5, make_datetime("2024-06-03", "07:58:00")))
            .await
            .unwrap();

        let result = f
            .tracker
            .check_in(command(5, make_datetime("2024-06-03", "08:30:00")))
            .await;
        assert!(matches!(result, Err(EngineError::AlreadyCheckedIn { .. })));
    }

    #[tokio::test]
    async fn test_check_in_after_check_out_is_already_completed() {
        let f = fixture();
        f.tracker
            .check_in(command(5, make_datetime("2024-06-03", "07:58:00")))
            .await
            .unwrap();
        f.tracker
            .check_out(command(5, make_datetime("2024-06-03", "17:00:00")))
            .await
            .unwrap();

        let result = f
            .tracker
            .check_in(command(5, make_datetime("2024-06-03", "18:00:00")))
            .await;
        assert!(matches!(result, Err(EngineError::AlreadyCompleted { .. })));
    }

    #[tokio::test]
    async fn test_check_out_derives_exact_hours() {
        let f = fixture_with(
            SettingsStore::with_defaults(),
            Arc::new(StaticGeocoder::new("1 Le Loi, District 1")),
        );
        f.tracker
            .check_in(command(5, make_datetime("2024-06-03", "08:00:00")))
            .await
            .unwrap();
        let row = f
            .tracker
            .check_out(command(5, make_datetime("2024-06-03", "14:30:00")))
            .await
            .unwrap();

        assert!(row.is_completed());
        assert_eq!(row.total_hours, Some(dec("6.5")));
        assert_eq!(row.check_out.unwrap().address, "1 Le Loi, District 1");
        assert_eq!(f.audit.entries().len(), 2);
        assert_eq!(f.audit.entries()[1].action, AuditAction::CheckOut);
    }

    #[tokio::test]
    async fn test_check_out_without_check_in() {
        let f = fixture();
        let result = f
            .tracker
            .check_out(command(5, make_datetime("2024-06-03", "17:00:00")))
            .await;
        assert!(matches!(result, Err(EngineError::NotCheckedIn { .. })));
    }

    #[tokio::test]
    async fn test_second_check_out_is_rejected() {
        let f = fixture();
        f.tracker
            .check_in(command(5, make_datetime("2024-06-03", "08:00:00")))
            .await
            .unwrap();
        f.tracker
            .check_out(command(5, make_datetime("2024-06-03", "17:00:00")))
            .await
            .unwrap();

        let result = f
            .tracker
            .check_out(command(5, make_datetime("2024-06-03", "17:05:00")))
            .await;
        assert!(matches!(result, Err(EngineError::AlreadyCheckedOut { .. })));
    }

    #[tokio::test]
    async fn test_check_out_before_check_in_is_invalid() {
        let f = fixture();
        f.tracker
            .check_in(command(5, make_datetime("2024-06-03", "08:00:00")))
            .await
            .unwrap();
        let result = f
            .tracker
            .check_out(command(5, make_datetime("2024-06-03", "07:00:00")))
            .await;
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_missing_evidence_stores_nothing() {
        let f = fixture();
        let mut cmd = command(5, make_datetime("2024-06-03", "08:00:00"));
        cmd.evidence = None;

        let result = f.tracker.check_in(cmd).await;

        assert!(matches!(result, Err(EngineError::MissingEvidence)));
        assert!(f.tracker.today(5, make_datetime("2024-06-03", "00:00:00").date()).is_none());
        assert!(f.evidence.is_empty());
        assert!(f.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_geofence_flags_far_away_check_in() {
        let settings = SettingsStore::with_defaults().with_value("GEOFENCE_ENABLED", "true");
        let f = fixture_with(settings, Arc::new(NoopGeocoder));
        let mut cmd = command(5, make_datetime("2024-06-03", "08:00:00"));
        cmd.location = GeoPoint::new(dec("10.8000"), dec("106.7009"));

        let row = f.tracker.check_in(cmd).await.unwrap();

        assert!(!row.is_within_geofence);
        assert!(row.is_open());
    }

    #[tokio::test]
    async fn test_notes_are_trimmed_and_bounded() {
        let f = fixture();
        let mut cmd = command(5, make_datetime("2024-06-03", "08:00:00"));
        cmd.notes = Some("x".repeat(1001));
        assert!(matches!(
            f.tracker.check_in(cmd.clone()).await,
            Err(EngineError::Validation { .. })
        ));

        cmd.notes = Some("  client visit ".to_string());
        let row = f.tracker.check_in(cmd).await.unwrap();
        assert_eq!(row.check_in.unwrap().notes.as_deref(), Some("client visit"));
    }

    #[tokio::test]
    async fn test_history_pages_newest_first() {
        let f = fixture();
        for day in 3..=7 {
            f.tracker
                .check_in(command(5, make_datetime(&format!("2024-06-0{}", day), "08:00:00")))
                .await
                .unwrap();
        }

        let first = f.tracker.history(5, 1, 2).unwrap();
        let last = f.tracker.history(5, 3, 2).unwrap();

        assert_eq!(first.total, 5);
        assert_eq!(first.items[0].work_date.to_string(), "2024-06-07");
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].work_date.to_string(), "2024-06-03");
        assert!(f.tracker.history(5, 0, 2).is_err());
        assert!(f.tracker.history(5, 1, 0).is_err());
    }

    #[tokio::test]
    async fn test_history_page_beyond_range_is_empty() {
        let f = fixture();
        f.tracker
            .check_in(command(5, make_datetime("2024-06-03", "08:00:00")))
            .await
            .unwrap();

        let page = f.tracker.history(5, usize::MAX, MAX_PAGE_SIZE).unwrap();

        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_concurrent_check_ins_produce_one_row() {
        let f = Arc::new(fixture());
        let at = make_datetime("2024-06-03", "08:00:00");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let f = f.clone();
                tokio::spawn(async move { f.tracker.check_in(command(5, at)).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(EngineError::AlreadyCheckedIn { .. }) => {}
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(f.tracker.in_range(DateRange::new(at.date(), at.date()).unwrap()).len(), 1);
    }
}
