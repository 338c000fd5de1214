//! Request types for the attendance API.
//!
//! This module defines the JSON bodies and query strings the handlers accept
//! and their conversion into engine commands.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::attendance::CheckpointCommand;
use crate::collaborators::EvidenceUpload;
use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, DepartmentId, EmployeeId, GeoPoint, PayrollQuery};

/// Photo evidence posted inline with a check-in or check-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePayload {
    /// Original file name; its extension decides the accepted format.
    pub file_name: String,
    /// MIME type reported by the client.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Base64-encoded file content.
    pub data: String,
}

impl EvidencePayload {
    /// Decodes the payload into an upload.
    pub fn decode(self) -> EngineResult<EvidenceUpload> {
        let data = STANDARD
            .decode(self.data.trim())
            .map_err(|e| EngineError::validation("evidence.data", format!("invalid base64: {}", e)))?;
        let mut upload = EvidenceUpload::new(self.file_name, data);
        upload.content_type = self.content_type;
        Ok(upload)
    }
}

/// Request body for `POST /attendance/check-in` and `POST /attendance/check-out`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRequest {
    /// Latitude reported by the device.
    pub latitude: Decimal,
    /// Longitude reported by the device.
    pub longitude: Decimal,
    /// Optional note.
    #[serde(default)]
    pub notes: Option<String>,
    /// Photo evidence.
    #[serde(default)]
    pub evidence: Option<EvidencePayload>,
}

impl CheckpointRequest {
    /// Builds the tracker command for `employee_id` at `timestamp`.
    pub fn into_command(
        self,
        employee_id: EmployeeId,
        timestamp: NaiveDateTime,
    ) -> EngineResult<CheckpointCommand> {
        let evidence = self.evidence.map(EvidencePayload::decode).transpose()?;
        Ok(CheckpointCommand {
            employee_id,
            timestamp,
            evidence,
            location: GeoPoint::new(self.latitude, self.longitude),
            notes: self.notes,
        })
    }
}

/// Query string for `GET /attendance/history`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoryParams {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

/// Request body for `POST /payroll/preview` and `POST /payroll/export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// First workday (inclusive).
    pub from: NaiveDate,
    /// Last workday (inclusive).
    pub to: NaiveDate,
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    /// Restrict to one department.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

impl TryFrom<PayrollRequest> for PayrollQuery {
    type Error = EngineError;

    fn try_from(req: PayrollRequest) -> Result<Self, Self::Error> {
        Ok(PayrollQuery {
            range: DateRange::new(req.from, req.to)?,
            employee_id: req.employee_id,
            department_id: req.department_id,
        })
    }
}
