//! Attendance tracking for the attendance engine.
//!
//! This module owns the per-employee, per-day check-in/check-out state
//! machine and the derivations made along the way:
//!
//! - **Lateness**: check-in strictly after `CHECK_IN_STANDARD_TIME`
//! - **Worked hours**: exact decimal hours between check-in and check-out
//! - **Geofence**: whether the reported location is inside the work site
//! - **Deduction hours**: hours deducted for an unexcused late arrival
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::attendance::{AttendanceTracker, CheckpointCommand};
//! use attendance_engine::collaborators::{
//!     EvidenceUpload, InMemoryEvidenceStore, NoopGeocoder, TracingAuditSink,
//! };
//! use attendance_engine::config::SettingsStore;
//! use attendance_engine::models::GeoPoint;
//! use attendance_engine::store::AttendanceStore;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! # async fn run() -> attendance_engine::error::EngineResult<()> {
//! let tracker = AttendanceTracker::new(
//!     Arc::new(AttendanceStore::new()),
//!     Arc::new(SettingsStore::with_defaults()),
//!     Arc::new(InMemoryEvidenceStore::new()),
//!     Arc::new(NoopGeocoder),
//!     Arc::new(TracingAuditSink),
//! );
//!
//! let row = tracker
//!     .check_in(CheckpointCommand {
//!         employee_id: 5,
//!         timestamp: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap().and_hms_opt(8, 5, 0).unwrap(),
//!         evidence: Some(EvidenceUpload::new("selfie.jpg", vec![0xFF, 0xD8])),
//!         location: GeoPoint::new(Decimal::new(107769, 4), Decimal::new(1067009, 4)),
//!         notes: None,
//!     })
//!     .await?;
//! assert!(row.is_late);
//! # Ok(())
//! # }
//! ```

mod deduction;
mod evidence;
mod geofence;
mod tracker;

pub use deduction::{DeductionPolicy, FlatLateDeduction};
pub use evidence::{CheckpointSide, evidence_file_name, validate_evidence};
pub use geofence::{distance_m, is_within_geofence};
pub use tracker::{AttendancePage, AttendanceTracker, CheckpointCommand, MAX_PAGE_SIZE};
