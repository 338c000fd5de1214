//! The Pending → {Approved, Rejected, Cancelled} state machine.
//!
//! Review and cancel race on the same request. Both run their transition
//! under the request's lock via [`Request::settle`], so exactly one wins and
//! the loser sees `NotPending`. Approval side effects on attendance are
//! applied under that same lock, so they happen at most once.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::collaborators::AuditSink;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ActorContext, AuditAction, AuditEntry, DateRange, EmployeeId, Request, RequestId, RequestKind,
    RequestPayload, RequestStatus, Review, ReviewAction,
};
use crate::store::{AttendanceStore, RequestStore};

use super::submission::{ReviewDecision, Submission};

/// Criteria for [`RequestWorkflow::list`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    /// Only this employee's requests.
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    /// Only this variant.
    #[serde(default)]
    pub kind: Option<RequestKind>,
    /// Only this status.
    #[serde(default)]
    pub status: Option<RequestStatus>,
    /// Only requests touching days on or after this date.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Only requests touching days on or before this date.
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Case-insensitive text search over reason, task and proof.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl RequestFilter {
    fn matches(&self, request: &Request) -> bool {
        self.employee_id.is_none_or(|id| request.employee_id == id)
            && self.kind.is_none_or(|kind| request.kind() == kind)
            && self.status.is_none_or(|status| request.status == status)
            && request.payload.overlaps(self.from, self.to)
            && self
                .keyword
                .as_deref()
                .is_none_or(|keyword| request.matches_keyword(keyword))
    }
}

/// Submits, reviews, cancels and queries requests.
pub struct RequestWorkflow {
    requests: Arc<RequestStore>,
    attendance: Arc<AttendanceStore>,
    audit: Arc<dyn AuditSink>,
}

impl RequestWorkflow {
    /// Creates a workflow over the given stores.
    pub fn new(
        requests: Arc<RequestStore>,
        attendance: Arc<AttendanceStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            requests,
            attendance,
            audit,
        }
    }

    /// Creates a Pending request owned by the actor.
    ///
    /// Overtime and late requests are linked to the attendance row for their
    /// day when one exists. The link only marks that a request was made; it
    /// is not a state change on the row.
    pub fn submit(
        &self,
        actor: &ActorContext,
        submission: Submission,
        now: NaiveDateTime,
    ) -> EngineResult<Request> {
        let validated = submission.validate()?;
        let employee_id = actor.actor_id;

        let request = self.requests.insert_with(|request_id| Request {
            request_id,
            employee_id,
            payload: validated.payload,
            reason: validated.reason,
            proof_reference: validated.proof_reference,
            status: RequestStatus::Pending,
            review: None,
            version: 1,
            created_at: now,
            updated_at: now,
        });

        let linked = match &request.payload {
            RequestPayload::Overtime(ot) => self
                .attendance
                .modify(employee_id, ot.work_date, |row| {
                    row.link_overtime_request(request.request_id, now)
                })
                .is_some(),
            RequestPayload::Late(late) => self
                .attendance
                .modify(employee_id, late.request_date, |row| {
                    row.link_late_request(request.request_id, now)
                })
                .is_some(),
            RequestPayload::Leave(_) => false,
        };

        info!(
            request_id = request.request_id,
            employee_id,
            kind = %request.kind(),
            linked_attendance = linked,
            "Request submitted"
        );
        self.audit.record(AuditEntry {
            actor_id: employee_id,
            action: AuditAction::Create,
            entity_type: request.kind().entity_type().to_string(),
            entity_id: Some(request.request_id),
            old_value: None,
            new_value: serde_json::to_value(&request).ok(),
            description: format!("Submitted {} request", request.kind()),
            metadata: None,
            recorded_at: now,
        });

        Ok(request)
    }

    /// Approves or rejects a Pending request.
    ///
    /// # Errors
    ///
    /// * `Forbidden` - the actor is not an admin
    /// * `RequestNotFound` - no such request
    /// * `NotPending` - the request was already settled
    /// * `Validation` - note too long, or an hour override that is not
    ///   positive or is sent for a request other than overtime
    pub fn review(
        &self,
        actor: &ActorContext,
        request_id: RequestId,
        decision: ReviewDecision,
        now: NaiveDateTime,
    ) -> EngineResult<Request> {
        if !actor.is_admin() {
            warn!(actor_id = actor.actor_id, request_id, "Non-admin review rejected");
            return Err(EngineError::Forbidden {
                actor_id: actor.actor_id,
                action: "review requests".to_string(),
            });
        }
        let note = decision.validate()?;

        let (request, old_status) = self
            .requests
            .modify(request_id, |request| {
                let old_status = request.status;
                let status = match decision.action {
                    ReviewAction::Approve => RequestStatus::Approved,
                    ReviewAction::Reject => RequestStatus::Rejected,
                };
                if decision.approved_hours.is_some()
                    && !matches!(request.payload, RequestPayload::Overtime(_))
                {
                    return Err(EngineError::validation(
                        "approved_hours",
                        format!("does not apply to a {} request", request.kind()),
                    ));
                }
                let review = Review {
                    reviewer_id: actor.actor_id,
                    reviewed_at: now,
                    note: note.clone(),
                };
                request.settle(status, Some(review), now)?;

                if status == RequestStatus::Approved {
                    self.apply_approval(request, decision.approved_hours, now);
                }
                Ok((request.clone(), old_status))
            })
            .unwrap_or_else(|| Err(EngineError::RequestNotFound { request_id }))?;

        info!(
            request_id,
            reviewer_id = actor.actor_id,
            kind = %request.kind(),
            status = %request.status,
            "Request reviewed"
        );
        self.audit.record(AuditEntry {
            actor_id: actor.actor_id,
            action: AuditAction::Review,
            entity_type: request.kind().entity_type().to_string(),
            entity_id: Some(request_id),
            old_value: Some(serde_json::json!({ "status": old_status })),
            new_value: Some(serde_json::json!({
                "status": request.status,
                "note": note,
                "approved_hours": decision.approved_hours.map(|h| h.normalize().to_string()),
            })),
            description: format!(
                "{} {} request {}",
                request.status,
                request.kind(),
                request_id
            ),
            metadata: Some(serde_json::json!({ "employee_id": request.employee_id })),
            recorded_at: now,
        });

        Ok(request)
    }

    /// Applies the attendance side effects of an approval.
    ///
    /// Runs while the caller holds the request's lock.
    fn apply_approval(
        &self,
        request: &mut Request,
        approved_hours: Option<rust_decimal::Decimal>,
        now: NaiveDateTime,
    ) {
        let request_id = request.request_id;
        let employee_id = request.employee_id;
        match &mut request.payload {
            RequestPayload::Overtime(ot) => {
                if approved_hours.is_some() {
                    ot.approved_hours = approved_hours;
                }
                let hours = ot.effective_hours();
                let applied = self
                    .attendance
                    .modify(employee_id, ot.work_date, |row| {
                        row.approve_overtime(request_id, hours, now)
                    })
                    .is_some();
                if !applied {
                    warn!(
                        request_id,
                        employee_id,
                        work_date = %ot.work_date,
                        "Approved overtime has no attendance row to apply to"
                    );
                }
            }
            RequestPayload::Late(late) => {
                self.attendance.modify(employee_id, late.request_date, |row| {
                    row.link_late_request(request_id, now)
                });
            }
            RequestPayload::Leave(_) => {}
        }
    }

    /// Withdraws a Pending request. Only its owner may cancel it.
    ///
    /// # Errors
    ///
    /// * `RequestNotFound` - no such request
    /// * `Forbidden` - the actor does not own the request
    /// * `NotPending` - the request was already settled
    pub fn cancel(
        &self,
        actor: &ActorContext,
        request_id: RequestId,
        now: NaiveDateTime,
    ) -> EngineResult<Request> {
        let request = self
            .requests
            .modify(request_id, |request| {
                if !request.is_owned_by(actor.actor_id) {
                    return Err(EngineError::Forbidden {
                        actor_id: actor.actor_id,
                        action: format!("cancel request {}", request_id),
                    });
                }
                request.settle(RequestStatus::Cancelled, None, now)?;
                Ok(request.clone())
            })
            .unwrap_or_else(|| Err(EngineError::RequestNotFound { request_id }))?;

        info!(request_id, employee_id = actor.actor_id, "Request cancelled");
        self.audit.record(AuditEntry {
            actor_id: actor.actor_id,
            action: AuditAction::Cancel,
            entity_type: request.kind().entity_type().to_string(),
            entity_id: Some(request_id),
            old_value: Some(serde_json::json!({ "status": RequestStatus::Pending })),
            new_value: Some(serde_json::json!({ "status": RequestStatus::Cancelled })),
            description: format!("Cancelled {} request {}", request.kind(), request_id),
            metadata: None,
            recorded_at: now,
        });

        Ok(request)
    }

    /// Returns one request. Staff may only read their own.
    pub fn get(&self, actor: &ActorContext, request_id: RequestId) -> EngineResult<Request> {
        let request = self
            .requests
            .get(request_id)
            .ok_or(EngineError::RequestNotFound { request_id })?;
        if !actor.is_admin() && !request.is_owned_by(actor.actor_id) {
            return Err(EngineError::Forbidden {
                actor_id: actor.actor_id,
                action: format!("view request {}", request_id),
            });
        }
        Ok(request)
    }

    /// Requests matching `filter`, newest first.
    ///
    /// Staff always see only their own requests, whatever the filter says.
    pub fn list(&self, actor: &ActorContext, filter: &RequestFilter) -> Vec<Request> {
        let mut filter = filter.clone();
        if !actor.is_admin() {
            filter.employee_id = Some(actor.actor_id);
        }
        self.requests.filter(|request| filter.matches(request))
    }

    /// The (employee, day) pairs covered by an approved late request in `range`.
    pub fn excused_late_days(&self, range: DateRange) -> HashSet<(EmployeeId, NaiveDate)> {
        self.requests
            .filter(|request| {
                request.status == RequestStatus::Approved && request.kind() == RequestKind::Late
            })
            .into_iter()
            .filter_map(|request| match request.payload {
                RequestPayload::Late(late) if range.contains(late.request_date) => {
                    Some((request.employee_id, late.request_date))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InMemoryAuditSink;
    use crate::models::{Attendance, LeaveType};
    use crate::workflow::{LateSubmission, LeaveSubmission, OvertimeSubmission};
    use chrono::NaiveTime;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, 0, 0).unwrap()
    }

    struct Fixture {
        workflow: RequestWorkflow,
        attendance: Arc<AttendanceStore>,
        audit: Arc<InMemoryAuditSink>,
    }

    fn fixture() -> Fixture {
        let attendance = Arc::new(AttendanceStore::new());
        let audit = Arc::new(InMemoryAuditSink::new());
        Fixture {
            workflow: RequestWorkflow::new(
                Arc::new(RequestStore::new()),
                attendance.clone(),
                audit.clone(),
            ),
            attendance,
            audit,
        }
    }

    fn checked_in(store: &AttendanceStore, employee_id: EmployeeId, d: u32) {
        let mut row = Attendance::new(store.next_id(), employee_id, date(d), at(d, 8));
        row.check_in_time = Some(at(d, 8));
        store.insert_new(row).unwrap();
    }

    fn overtime(d: u32, hours: &str) -> Submission {
        Submission::Overtime(OvertimeSubmission {
            work_date: date(d),
            actual_check_out_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            overtime_hours: dec(hours),
            reason: "Release".to_string(),
            task_description: None,
            proof_reference: None,
        })
    }

    fn late(d: u32) -> Submission {
        Submission::Late(LateSubmission {
            request_date: date(d),
            expected_arrival_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            reason: "Doctor".to_string(),
            proof_reference: None,
        })
    }

    fn leave(start: u32, end: u32) -> Submission {
        Submission::Leave(LeaveSubmission {
            leave_type: LeaveType::Annual,
            start_date: date(start),
            end_date: date(end),
            total_days: None,
            reason: "Holiday".to_string(),
            proof_reference: None,
        })
    }

    #[test]
    fn test_submit_creates_pending_request_and_links_attendance() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);

        let request = f
            .workflow
            .submit(&ActorContext::staff(5), overtime(3, "2"), at(3, 21))
            .unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.employee_id, 5);
        let row = f.attendance.get(5, date(3)).unwrap();
        assert!(row.has_overtime_request);
        assert_eq!(row.overtime_request_id, Some(request.request_id));
        assert!(!row.is_overtime_approved);
        assert_eq!(f.audit.entries()[0].action, AuditAction::Create);
        assert_eq!(f.audit.entries()[0].entity_type, "OvertimeRequest");
    }

    #[test]
    fn test_submit_without_attendance_row_still_succeeds() {
        let f = fixture();
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), late(4), at(3, 21))
            .unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(f.attendance.is_empty());
    }

    #[test]
    fn test_approving_overtime_sets_attendance_hours() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), overtime(3, "2.5"), at(3, 21))
            .unwrap();

        let reviewed = f
            .workflow
            .review(&ActorContext::admin(1), request.request_id, ReviewDecision::approve(), at(4, 9))
            .unwrap();

        assert_eq!(reviewed.status, RequestStatus::Approved);
        assert_eq!(reviewed.version, 2);
        assert_eq!(reviewed.review.as_ref().unwrap().reviewer_id, 1);
        let row = f.attendance.get(5, date(3)).unwrap();
        assert!(row.is_overtime_approved);
        assert_eq!(row.approved_overtime_hours, dec("2.5"));
    }

    #[test]
    fn test_second_approved_overtime_overwrites_hours() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let admin = ActorContext::admin(1);
        let staff = ActorContext::staff(5);

        let first = f.workflow.submit(&staff, overtime(3, "2"), at(3, 21)).unwrap();
        let second = f.workflow.submit(&staff, overtime(3, "3"), at(3, 22)).unwrap();
        f.workflow
            .review(&admin, first.request_id, ReviewDecision::approve(), at(4, 9))
            .unwrap();
        f.workflow
            .review(&admin, second.request_id, ReviewDecision::approve(), at(4, 10))
            .unwrap();

        let row = f.attendance.get(5, date(3)).unwrap();
        assert_eq!(row.approved_overtime_hours, dec("3"));
        assert_eq!(row.overtime_request_id, Some(second.request_id));
    }

    #[test]
    fn test_approval_can_override_hours() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), overtime(3, "4"), at(3, 21))
            .unwrap();

        let mut decision = ReviewDecision::approve();
        decision.approved_hours = Some(dec("3"));
        let reviewed = f
            .workflow
            .review(&ActorContext::admin(1), request.request_id, decision, at(4, 9))
            .unwrap();

        match reviewed.payload {
            RequestPayload::Overtime(ot) => {
                assert_eq!(ot.overtime_hours, dec("4"));
                assert_eq!(ot.effective_hours(), dec("3"));
            }
            other => panic!("Expected overtime payload, got {:?}", other),
        }
        assert_eq!(
            f.attendance.get(5, date(3)).unwrap().approved_overtime_hours,
            dec("3")
        );
    }

    #[test]
    fn test_hour_override_only_applies_to_overtime() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let late_request = f
            .workflow
            .submit(&ActorContext::staff(5), late(3), at(3, 7))
            .unwrap();
        let leave_request = f
            .workflow
            .submit(&ActorContext::staff(5), leave(10, 11), at(3, 7))
            .unwrap();

        for id in [late_request.request_id, leave_request.request_id] {
            let mut decision = ReviewDecision::approve();
            decision.approved_hours = Some(dec("2"));
            let result = f
                .workflow
                .review(&ActorContext::admin(1), id, decision, at(3, 10));

            match result {
                Err(EngineError::Validation { field, .. }) => assert_eq!(field, "approved_hours"),
                other => panic!("Expected Validation, got {:?}", other),
            }
            let stored = f.workflow.get(&ActorContext::admin(1), id).unwrap();
            assert_eq!(stored.status, RequestStatus::Pending);
            assert_eq!(stored.version, 1);
        }
        assert!(f.audit.entries().iter().all(|e| e.action != AuditAction::Review));
    }

    #[test]
    fn test_rejection_has_no_attendance_side_effects() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), overtime(3, "2"), at(3, 21))
            .unwrap();

        let reviewed = f
            .workflow
            .review(
                &ActorContext::admin(1),
                request.request_id,
                ReviewDecision::reject("Not pre-approved"),
                at(4, 9),
            )
            .unwrap();

        assert_eq!(reviewed.status, RequestStatus::Rejected);
        assert_eq!(
            reviewed.review.unwrap().note.as_deref(),
            Some("Not pre-approved")
        );
        let row = f.attendance.get(5, date(3)).unwrap();
        assert!(!row.is_overtime_approved);
        assert_eq!(row.approved_overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn test_approving_late_links_attendance() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), late(3), at(3, 7))
            .unwrap();
        f.workflow
            .review(&ActorContext::admin(1), request.request_id, ReviewDecision::approve(), at(3, 10))
            .unwrap();

        let row = f.attendance.get(5, date(3)).unwrap();
        assert!(row.has_late_request);
        assert_eq!(row.late_request_id, Some(request.request_id));
        assert!(f.workflow.excused_late_days(DateRange::new(date(1), date(30)).unwrap()).contains(&(5, date(3))));
    }

    #[test]
    fn test_approving_leave_touches_no_attendance() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let before = f.attendance.get(5, date(3)).unwrap();
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), leave(3, 4), at(2, 9))
            .unwrap();
        f.workflow
            .review(&ActorContext::admin(1), request.request_id, ReviewDecision::approve(), at(2, 10))
            .unwrap();

        assert_eq!(f.attendance.get(5, date(3)).unwrap(), before);
    }

    #[test]
    fn test_review_requires_admin() {
        let f = fixture();
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), late(3), at(3, 7))
            .unwrap();
        let result = f.workflow.review(
            &ActorContext::staff(6),
            request.request_id,
            ReviewDecision::approve(),
            at(3, 8),
        );
        assert!(matches!(result, Err(EngineError::Forbidden { .. })));
        assert_eq!(
            f.workflow.get(&ActorContext::staff(5), request.request_id).unwrap().status,
            RequestStatus::Pending
        );
    }

    #[test]
    fn test_reviewing_settled_request_is_not_pending() {
        let f = fixture();
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), late(3), at(3, 7))
            .unwrap();
        let admin = ActorContext::admin(1);
        f.workflow
            .review(&admin, request.request_id, ReviewDecision::reject("no"), at(3, 8))
            .unwrap();

        let result =
            f.workflow
                .review(&admin, request.request_id, ReviewDecision::approve(), at(3, 9));
        assert!(matches!(
            result,
            Err(EngineError::NotPending {
                status: RequestStatus::Rejected,
                ..
            })
        ));
    }

    #[test]
    fn test_review_unknown_request() {
        let f = fixture();
        let result = f.workflow.review(
            &ActorContext::admin(1),
            42,
            ReviewDecision::approve(),
            at(3, 9),
        );
        assert!(matches!(
            result,
            Err(EngineError::RequestNotFound { request_id: 42 })
        ));
    }

    #[test]
    fn test_cancel_by_owner_only() {
        let f = fixture();
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), leave(10, 12), at(3, 9))
            .unwrap();

        let stranger = f
            .workflow
            .cancel(&ActorContext::staff(6), request.request_id, at(3, 10));
        assert!(matches!(stranger, Err(EngineError::Forbidden { .. })));

        let cancelled = f
            .workflow
            .cancel(&ActorContext::staff(5), request.request_id, at(3, 10))
            .unwrap();
        assert_eq!(cancelled.status, RequestStatus::Cancelled);
        assert_eq!(f.audit.entries().last().unwrap().action, AuditAction::Cancel);

        let again = f
            .workflow
            .cancel(&ActorContext::staff(5), request.request_id, at(3, 11));
        assert!(matches!(again, Err(EngineError::NotPending { .. })));
    }

    #[test]
    fn test_cancelled_request_cannot_be_approved() {
        let f = fixture();
        checked_in(&f.attendance, 5, 3);
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), overtime(3, "2"), at(3, 21))
            .unwrap();
        f.workflow
            .cancel(&ActorContext::staff(5), request.request_id, at(3, 22))
            .unwrap();

        let result = f.workflow.review(
            &ActorContext::admin(1),
            request.request_id,
            ReviewDecision::approve(),
            at(4, 9),
        );
        assert!(matches!(result, Err(EngineError::NotPending { .. })));
        assert!(!f.attendance.get(5, date(3)).unwrap().is_overtime_approved);
    }

    #[test]
    fn test_review_and_cancel_race_has_one_winner() {
        for _ in 0..50 {
            let f = Arc::new(fixture());
            checked_in(&f.attendance, 5, 3);
            let request = f
                .workflow
                .submit(&ActorContext::staff(5), overtime(3, "2"), at(3, 21))
                .unwrap();
            let id = request.request_id;

            let reviewer = {
                let f = f.clone();
                std::thread::spawn(move || {
                    f.workflow
                        .review(&ActorContext::admin(1), id, ReviewDecision::approve(), at(4, 9))
                })
            };
            let canceller = {
                let f = f.clone();
                std::thread::spawn(move || f.workflow.cancel(&ActorContext::staff(5), id, at(4, 9)))
            };

            let reviewed = reviewer.join().unwrap();
            let cancelled = canceller.join().unwrap();
            assert!(reviewed.is_ok() ^ cancelled.is_ok());

            let stored = f.workflow.get(&ActorContext::admin(1), id).unwrap();
            let row = f.attendance.get(5, date(3)).unwrap();
            assert_eq!(stored.version, 2);
            if reviewed.is_ok() {
                assert_eq!(stored.status, RequestStatus::Approved);
                assert!(row.is_overtime_approved);
            } else {
                assert_eq!(stored.status, RequestStatus::Cancelled);
                assert!(!row.is_overtime_approved);
                assert!(matches!(reviewed, Err(EngineError::NotPending { .. })));
            }
        }
    }

    #[test]
    fn test_concurrent_approve_and_reject_settle_once() {
        for _ in 0..50 {
            let f = Arc::new(fixture());
            checked_in(&f.attendance, 5, 3);
            let request = f
                .workflow
                .submit(&ActorContext::staff(5), overtime(3, "2"), at(3, 21))
                .unwrap();
            let id = request.request_id;

            let approver = {
                let f = f.clone();
                std::thread::spawn(move || {
                    f.workflow
                        .review(&ActorContext::admin(1), id, ReviewDecision::approve(), at(4, 9))
                })
            };
            let rejecter = {
                let f = f.clone();
                std::thread::spawn(move || {
                    f.workflow.review(
                        &ActorContext::admin(2),
                        id,
                        ReviewDecision::reject("Not planned"),
                        at(4, 9),
                    )
                })
            };

            let approved = approver.join().unwrap();
            let rejected = rejecter.join().unwrap();
            assert!(approved.is_ok() ^ rejected.is_ok());

            let stored = f.workflow.get(&ActorContext::admin(1), id).unwrap();
            let row = f.attendance.get(5, date(3)).unwrap();
            assert_eq!(stored.version, 2);
            if approved.is_ok() {
                assert_eq!(stored.status, RequestStatus::Approved);
                assert!(row.is_overtime_approved);
                assert_eq!(row.approved_overtime_hours, dec("2"));
                assert!(matches!(rejected, Err(EngineError::NotPending { .. })));
            } else {
                assert_eq!(stored.status, RequestStatus::Rejected);
                assert!(!row.is_overtime_approved);
                assert_eq!(row.approved_overtime_hours, Decimal::ZERO);
                assert!(matches!(approved, Err(EngineError::NotPending { .. })));
            }
        }
    }

    #[test]
    fn test_list_filters_and_orders_newest_first() {
        let f = fixture();
        let staff = ActorContext::staff(5);
        let other = ActorContext::staff(6);
        let first = f.workflow.submit(&staff, late(3), at(3, 7)).unwrap();
        let second = f.workflow.submit(&staff, leave(10, 14), at(3, 8)).unwrap();
        f.workflow.submit(&other, overtime(3, "1"), at(3, 9)).unwrap();

        let own = f.workflow.list(&staff, &RequestFilter::default());
        let ids: Vec<_> = own.iter().map(|r| r.request_id).collect();
        assert_eq!(ids, vec![second.request_id, first.request_id]);

        let everything = f.workflow.list(&ActorContext::admin(1), &RequestFilter::default());
        assert_eq!(everything.len(), 3);

        let leave_window = RequestFilter {
            from: Some(date(12)),
            to: Some(date(20)),
            ..RequestFilter::default()
        };
        let overlapping = f.workflow.list(&ActorContext::admin(1), &leave_window);
        assert_eq!(overlapping.len(), 1);
        assert_eq!(overlapping[0].kind(), RequestKind::Leave);

        let by_keyword = RequestFilter {
            keyword: Some("doctor".to_string()),
            status: Some(RequestStatus::Pending),
            ..RequestFilter::default()
        };
        assert_eq!(f.workflow.list(&ActorContext::admin(1), &by_keyword).len(), 1);
    }

    #[test]
    fn test_staff_cannot_read_or_list_others_requests() {
        let f = fixture();
        let request = f
            .workflow
            .submit(&ActorContext::staff(5), late(3), at(3, 7))
            .unwrap();

        assert!(matches!(
            f.workflow.get(&ActorContext::staff(6), request.request_id),
            Err(EngineError::Forbidden { .. })
        ));
        let spoofed = RequestFilter {
            employee_id: Some(5),
            ..RequestFilter::default()
        };
        assert!(f.workflow.list(&ActorContext::staff(6), &spoofed).is_empty());
    }
}
