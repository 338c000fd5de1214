//! Payroll runs.
//!
//! [`compute_salaries`] is the pure computation: attendance rows in, one
//! [`PayrollLine`] per employee out. [`PayrollEngine`] gathers its inputs
//! from the stores and settings, enforces the admin role and records the
//! export in the audit trail.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::collaborators::{AuditSink, EmployeeDirectory};
use crate::config::{PayrollSettings, SettingsProvider};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ActorContext, Attendance, AuditAction, AuditEntry, EmployeeId, PayrollLine, PayrollQuery,
    PayrollReport,
};
use crate::store::AttendanceStore;
use crate::workflow::RequestWorkflow;

use super::aggregation::aggregate_by_employee;
use super::salary::price_line;

/// Computes one payroll line per employee with attendance in the query window.
///
/// Lines are ordered by display name, then employee id, so identical inputs
/// always give identical output.
///
/// # Errors
///
/// Returns `NoDataInRange` when no row matches the window and filters. A
/// zero-salary line is never returned in its place.
pub fn compute_salaries(
    rows: &[Attendance],
    query: &PayrollQuery,
    directory: &dyn EmployeeDirectory,
    excused_late: &HashSet<(EmployeeId, NaiveDate)>,
    settings: &PayrollSettings,
) -> EngineResult<Vec<PayrollLine>> {
    let matching: Vec<&Attendance> = rows
        .iter()
        .filter(|row| query.range.contains(row.work_date))
        .filter(|row| query.employee_id.is_none_or(|id| row.employee_id == id))
        .filter(|row| {
            query.department_id.is_none_or(|department_id| {
                directory
                    .get(row.employee_id)
                    .is_some_and(|e| e.in_department(department_id))
            })
        })
        .collect();

    if matching.is_empty() {
        return Err(EngineError::NoDataInRange {
            from: query.range.from,
            to: query.range.to,
        });
    }

    let mut lines: Vec<PayrollLine> = aggregate_by_employee(matching, excused_late)
        .into_iter()
        .map(|(employee_id, totals)| {
            let employee = directory.get(employee_id);
            price_line(employee_id, employee.as_ref(), &totals, settings)
        })
        .collect();

    lines.sort_by(|a, b| {
        a.full_name
            .cmp(&b.full_name)
            .then(a.employee_id.cmp(&b.employee_id))
    });
    Ok(lines)
}

/// Runs payroll over the live stores.
pub struct PayrollEngine {
    attendance: Arc<AttendanceStore>,
    workflow: Arc<RequestWorkflow>,
    directory: Arc<dyn EmployeeDirectory>,
    settings: Arc<dyn SettingsProvider>,
    audit: Arc<dyn AuditSink>,
}

impl PayrollEngine {
    /// Creates an engine over the given stores and collaborators.
    pub fn new(
        attendance: Arc<AttendanceStore>,
        workflow: Arc<RequestWorkflow>,
        directory: Arc<dyn EmployeeDirectory>,
        settings: Arc<dyn SettingsProvider>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            attendance,
            workflow,
            directory,
            settings,
            audit,
        }
    }

    /// Computes payroll lines without recording anything.
    ///
    /// Settings are resolved first; an unparsable value aborts the run before
    /// any attendance is read.
    pub fn preview(
        &self,
        actor: &ActorContext,
        query: &PayrollQuery,
    ) -> EngineResult<Vec<PayrollLine>> {
        if !actor.is_admin() {
            return Err(EngineError::Forbidden {
                actor_id: actor.actor_id,
                action: "run payroll".to_string(),
            });
        }
        let settings = PayrollSettings::resolve(self.settings.as_ref())?;

        let start_time = Instant::now();
        let rows = self.attendance.in_range(query.range);
        let excused = self.workflow.excused_late_days(query.range);
        let lines = compute_salaries(
            &rows,
            query,
            self.directory.as_ref(),
            &excused,
            &settings,
        )?;

        info!(
            from = %query.range.from,
            to = %query.range.to,
            rows = rows.len(),
            employees = lines.len(),
            duration_us = start_time.elapsed().as_micros() as u64,
            "Payroll computed"
        );
        Ok(lines)
    }

    /// Computes payroll and wraps it into an audited report.
    pub fn export(
        &self,
        actor: &ActorContext,
        query: &PayrollQuery,
        now: NaiveDateTime,
    ) -> EngineResult<PayrollReport> {
        let lines = self.preview(actor, query)?;
        let report = PayrollReport::new(query.range, now, lines);

        self.audit.record(AuditEntry {
            actor_id: actor.actor_id,
            action: AuditAction::Export,
            entity_type: "Salary".to_string(),
            entity_id: None,
            old_value: None,
            new_value: None,
            description: format!(
                "Exported payroll {} to {} for {} employees",
                query.range.from, query.range.to, report.employee_count
            ),
            metadata: Some(serde_json::json!({
                "from": query.range.from,
                "to": query.range.to,
                "employee_id": query.employee_id,
                "department_id": query.department_id,
                "employee_count": report.employee_count,
                "grand_total": report.grand_total.normalize().to_string(),
                "file_name": format!("{}.xlsx", report.file_stem()),
            })),
            recorded_at: now,
        });

        Ok(report)
    }
}
