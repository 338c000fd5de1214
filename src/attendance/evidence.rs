//! Photo evidence checks for check-in and check-out.
//!
//! Evidence is validated before anything is stored: it must be present,
//! within the configured size limit and one of the accepted image types.

use chrono::NaiveDateTime;

use crate::collaborators::EvidenceUpload;
use crate::config::AttendancePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::EmployeeId;

/// Which side of the workday a photo belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSide {
    /// Arrival.
    CheckIn,
    /// Departure.
    CheckOut,
}

impl CheckpointSide {
    fn suffix(self) -> &'static str {
        match self {
            CheckpointSide::CheckIn => "checkin",
            CheckpointSide::CheckOut => "checkout",
        }
    }
}

/// Validates an upload and returns its normalised extension.
///
/// Checks run in order: presence, size, then format.
///
/// # Examples
///
/// ```
/// use attendance_engine::attendance::validate_evidence;
/// use attendance_engine::collaborators::EvidenceUpload;
/// use attendance_engine::config::AttendancePolicy;
/// use attendance_engine::error::EngineError;
///
/// let policy = AttendancePolicy::default();
///
/// let photo = EvidenceUpload::new("selfie.JPEG", vec![0xFF, 0xD8]);
/// assert_eq!(validate_evidence(Some(&photo), &policy).unwrap(), ".jpeg");
///
/// let document = EvidenceUpload::new("note.pdf", vec![1]);
/// assert!(matches!(
///     validate_evidence(Some(&document), &policy),
///     Err(EngineError::UnsupportedEvidenceFormat { .. })
/// ));
/// ```
pub fn validate_evidence(
    upload: Option<&EvidenceUpload>,
    policy: &AttendancePolicy,
) -> EngineResult<String> {
    let upload = match upload {
        Some(upload) if !upload.data.is_empty() => upload,
        _ => return Err(EngineError::MissingEvidence),
    };

    if upload.size() > policy.max_evidence_bytes {
        return Err(EngineError::EvidenceTooLarge {
            size: upload.size(),
            limit: policy.max_evidence_bytes,
        });
    }

    let extension = upload.extension().unwrap_or_default();
    if !policy.allowed_extensions.iter().any(|e| *e == extension) {
        return Err(EngineError::UnsupportedEvidenceFormat { extension });
    }

    Ok(extension)
}

/// Storage name for a photo, e.g. `5_20240603_081500_checkin.jpg`.
pub fn evidence_file_name(
    employee_id: EmployeeId,
    taken_at: NaiveDateTime,
    side: CheckpointSide,
    extension: &str,
) -> String {
    format!(
        "{}_{}_{}{}",
        employee_id,
        taken_at.format("%Y%m%d_%H%M%S"),
        side.suffix(),
        extension
    )
}
