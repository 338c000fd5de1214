//! Application state for the attendance API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

use crate::attendance::AttendanceTracker;
use crate::calculation::PayrollEngine;
use crate::collaborators::{
    AuditSink, EmployeeDirectory, EvidenceStore, InMemoryEvidenceStore, NoopGeocoder,
    ReverseGeocoder, TracingAuditSink,
};
use crate::config::SettingsProvider;
use crate::store::{AttendanceStore, RequestStore};
use crate::workflow::RequestWorkflow;

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Shared application state.
///
/// Holds the three engines behind `Arc`s plus the clock used to stamp
/// check-ins, reviews and exports.
#[derive(Clone)]
pub struct AppState {
    tracker: Arc<AttendanceTracker>,
    workflow: Arc<RequestWorkflow>,
    payroll: Arc<PayrollEngine>,
    clock: Clock,
}

impl AppState {
    /// Creates a state from already wired engines, using the local wall clock.
    pub fn new(
        tracker: Arc<AttendanceTracker>,
        workflow: Arc<RequestWorkflow>,
        payroll: Arc<PayrollEngine>,
    ) -> Self {
        Self {
            tracker,
            workflow,
            payroll,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Wires every engine over fresh in-memory stores.
    ///
    /// Evidence is kept in memory, audit entries go to `tracing` and no
    /// reverse geocoder is configured, so addresses fall back to coordinates.
    pub fn in_memory(
        settings: Arc<dyn SettingsProvider>,
        directory: Arc<dyn EmployeeDirectory>,
    ) -> Self {
        Self::with_collaborators(
            settings,
            directory,
            Arc::new(InMemoryEvidenceStore::new()),
            Arc::new(NoopGeocoder),
            Arc::new(TracingAuditSink),
        )
    }

    /// Wires every engine over fresh in-memory stores and the given collaborators.
    pub fn with_collaborators(
        settings: Arc<dyn SettingsProvider>,
        directory: Arc<dyn EmployeeDirectory>,
        evidence: Arc<dyn EvidenceStore>,
        geocoder: Arc<dyn ReverseGeocoder>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let attendance = Arc::new(AttendanceStore::new());
        let requests = Arc::new(RequestStore::new());

        let tracker = Arc::new(AttendanceTracker::new(
            attendance.clone(),
            settings.clone(),
            evidence,
            geocoder,
            audit.clone(),
        ));
        let workflow = Arc::new(RequestWorkflow::new(
            requests,
            attendance.clone(),
            audit.clone(),
        ));
        let payroll = Arc::new(PayrollEngine::new(
            attendance,
            workflow.clone(),
            directory,
            settings,
            audit,
        ));

        Self::new(tracker, workflow, payroll)
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the attendance tracker.
    pub fn tracker(&self) -> &AttendanceTracker {
        &self.tracker
    }

    /// Returns the request workflow.
    pub fn workflow(&self) -> &RequestWorkflow {
        &self.workflow
    }

    /// Returns the payroll engine.
    pub fn payroll(&self) -> &PayrollEngine {
        &self.payroll
    }

    /// Returns the current time according to the configured clock.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}
