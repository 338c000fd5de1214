//! Error types for the attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition an attendance, request or payroll operation can
//! reject with. Each variant belongs to exactly one [`ErrorKind`] and has a
//! stable reason code for callers that localise messages.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{EmployeeId, RequestId, RequestStatus};

/// The broad class an [`EngineError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input; nothing was persisted.
    Validation,
    /// The current state of an entity forbids the operation.
    StateConflict,
    /// A referenced entity does not exist.
    NotFound,
    /// Payroll could not be computed from the configured parameters.
    Computation,
    /// The backing store failed to apply a write.
    Persistence,
}

/// The main error type for the attendance engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/settings.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/settings.yaml");
/// assert_eq!(error.kind(), ErrorKind::Computation);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A field of an inbound command was missing or out of bounds.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// No photo evidence was attached to a check-in or check-out.
    #[error("Photo evidence is required")]
    MissingEvidence,

    /// The attached evidence exceeds the configured size limit.
    #[error("Photo evidence is {size} bytes, the limit is {limit} bytes")]
    EvidenceTooLarge {
        /// Size of the upload in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        limit: usize,
    },

    /// The attached evidence is not an accepted image type.
    #[error("Unsupported evidence format '{extension}', expected JPG, JPEG or PNG")]
    UnsupportedEvidenceFormat {
        /// The extension that was rejected.
        extension: String,
    },

    /// The employee already has an open attendance record for the day.
    #[error("Employee {employee_id} has already checked in on {work_date}")]
    AlreadyCheckedIn {
        /// The employee.
        employee_id: EmployeeId,
        /// The workday.
        work_date: NaiveDate,
    },

    /// The employee has checked in and out; the day is closed.
    #[error("Employee {employee_id} has already completed {work_date}")]
    AlreadyCompleted {
        /// The employee.
        employee_id: EmployeeId,
        /// The workday.
        work_date: NaiveDate,
    },

    /// Check-out was attempted without a check-in on the same day.
    #[error("Employee {employee_id} has not checked in on {work_date}")]
    NotCheckedIn {
        /// The employee.
        employee_id: EmployeeId,
        /// The workday.
        work_date: NaiveDate,
    },

    /// A second check-out was attempted on the same day.
    #[error("Employee {employee_id} has already checked out on {work_date}")]
    AlreadyCheckedOut {
        /// The employee.
        employee_id: EmployeeId,
        /// The workday.
        work_date: NaiveDate,
    },

    /// No request exists with the given id.
    #[error("Request not found: {request_id}")]
    RequestNotFound {
        /// The missing request id.
        request_id: RequestId,
    },

    /// The request has already left the Pending state.
    #[error("Request {request_id} is {status}, only pending requests can change")]
    NotPending {
        /// The request id.
        request_id: RequestId,
        /// The terminal status the request is in.
        status: RequestStatus,
    },

    /// The actor is not allowed to perform the action.
    #[error("Actor {actor_id} is not allowed to {action}")]
    Forbidden {
        /// The acting employee.
        actor_id: EmployeeId,
        /// The attempted action.
        action: String,
    },

    /// No attendance rows matched the payroll window and filters.
    #[error("No attendance data between {from} and {to}")]
    NoDataInRange {
        /// First day of the window.
        from: NaiveDate,
        /// Last day of the window.
        to: NaiveDate,
    },

    /// A configuration parameter does not parse to its declared type.
    #[error("Setting '{key}' has invalid value '{value}', expected {expected}")]
    InvalidSettingValue {
        /// The setting key.
        key: String,
        /// The raw value found.
        value: String,
        /// The expected type or range.
        expected: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A storage write failed and was rolled back.
    #[error("Persistence failure: {message}")]
    Persistence {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::MissingEvidence
            | Self::EvidenceTooLarge { .. }
            | Self::UnsupportedEvidenceFormat { .. } => ErrorKind::Validation,
            Self::AlreadyCheckedIn { .. }
            | Self::AlreadyCompleted { .. }
            | Self::NotCheckedIn { .. }
            | Self::AlreadyCheckedOut { .. }
            | Self::NotPending { .. }
            | Self::Forbidden { .. } => ErrorKind::StateConflict,
            Self::RequestNotFound { .. } | Self::NoDataInRange { .. } => ErrorKind::NotFound,
            Self::InvalidSettingValue { .. }
            | Self::ConfigNotFound { .. }
            | Self::ConfigParseError { .. } => ErrorKind::Computation,
            Self::Persistence { .. } => ErrorKind::Persistence,
        }
    }

    /// Returns the stable reason code used by callers to pick a localised message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MissingEvidence => "MISSING_EVIDENCE",
            Self::EvidenceTooLarge { .. } => "EVIDENCE_TOO_LARGE",
            Self::UnsupportedEvidenceFormat { .. } => "UNSUPPORTED_EVIDENCE_FORMAT",
            Self::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            Self::AlreadyCompleted { .. } => "ALREADY_COMPLETED",
            Self::NotCheckedIn { .. } => "NOT_CHECKED_IN",
            Self::AlreadyCheckedOut { .. } => "ALREADY_CHECKED_OUT",
            Self::RequestNotFound { .. } => "NOT_FOUND",
            Self::NotPending { .. } => "NOT_PENDING",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NoDataInRange { .. } => "NO_DATA_IN_RANGE",
            Self::InvalidSettingValue { .. } => "INVALID_SETTING_VALUE",
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } => "CONFIG_ERROR",
            Self::Persistence { .. } => "PERSISTENCE_ERROR",
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
