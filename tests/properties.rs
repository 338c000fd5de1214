//! Property tests for the attendance and request state machines.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use attendance_engine::attendance::{AttendanceTracker, CheckpointCommand};
use attendance_engine::calculation::aggregate_by_employee;
use attendance_engine::collaborators::{
    EvidenceUpload, InMemoryAuditSink, InMemoryEvidenceStore, NoopGeocoder,
};
use attendance_engine::config::SettingsStore;
use attendance_engine::models::{ActorContext, DateRange, GeoPoint, RequestStatus};
use attendance_engine::store::{AttendanceStore, RequestStore};
use attendance_engine::workflow::{LateSubmission, RequestWorkflow, ReviewDecision, Submission};

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap() + Duration::days(i64::from(offset))
}

fn command(employee_id: u32, timestamp: NaiveDateTime) -> CheckpointCommand {
    CheckpointCommand {
        employee_id,
        timestamp,
        evidence: Some(EvidenceUpload::new("photo.jpg", vec![0xFF, 0xD8, 0xFF])),
        location: GeoPoint::new(
            Decimal::from_str("10.7769").unwrap(),
            Decimal::from_str("106.7009").unwrap(),
        ),
        notes: None,
    }
}

fn tracker(store: Arc<AttendanceStore>) -> AttendanceTracker {
    AttendanceTracker::new(
        store,
        Arc::new(SettingsStore::with_defaults()),
        Arc::new(InMemoryEvidenceStore::new()),
        Arc::new(NoopGeocoder),
        Arc::new(InMemoryAuditSink::new()),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[derive(Debug, Clone)]
enum AttendanceOp {
    CheckIn { employee: u32, day: u32, minute: u32 },
    CheckOut { employee: u32, day: u32, minute: u32 },
}

fn attendance_op() -> impl Strategy<Value = AttendanceOp> {
    prop_oneof![
        (1u32..4, 0u32..3, 0u32..1440)
            .prop_map(|(employee, day, minute)| AttendanceOp::CheckIn { employee, day, minute }),
        (1u32..4, 0u32..3, 0u32..1440)
            .prop_map(|(employee, day, minute)| AttendanceOp::CheckOut { employee, day, minute }),
    ]
}

#[derive(Debug, Clone, Copy)]
enum RequestOp {
    Approve,
    Reject,
    CancelByOwner,
    CancelByOther,
    ReviewByStaff,
}

fn request_op() -> impl Strategy<Value = RequestOp> {
    prop_oneof![
        Just(RequestOp::Approve),
        Just(RequestOp::Reject),
        Just(RequestOp::CancelByOwner),
        Just(RequestOp::CancelByOther),
        Just(RequestOp::ReviewByStaff),
    ]
}

proptest! {
    #[test]
    fn prop_at_most_one_row_per_employee_and_day(ops in prop::collection::vec(attendance_op(), 1..40)) {
        let store = Arc::new(AttendanceStore::new());
        let tracker = tracker(store.clone());
        let rt = runtime();

        for op in ops {
            let (employee, timestamp, is_check_in) = match op {
                AttendanceOp::CheckIn { employee, day: d, minute } => {
                    (employee, day(d).and_hms_opt(0, 0, 0).unwrap() + Duration::minutes(i64::from(minute)), true)
                }
                AttendanceOp::CheckOut { employee, day: d, minute } => {
                    (employee, day(d).and_hms_opt(0, 0, 0).unwrap() + Duration::minutes(i64::from(minute)), false)
                }
            };
            let _ = rt.block_on(async {
                if is_check_in {
                    tracker.check_in(command(employee, timestamp)).await
                } else {
                    tracker.check_out(command(employee, timestamp)).await
                }
            });
        }

        let rows = store.in_range(DateRange::new(day(0), day(2)).unwrap());
        let keys: HashSet<_> = rows.iter().map(|r| (r.employee_id, r.work_date)).collect();
        prop_assert_eq!(keys.len(), rows.len());

        for row in &rows {
            prop_assert!(row.check_in_time.is_some());
            if let (Some(check_in), Some(check_out)) = (row.check_in_time, row.check_out_time) {
                prop_assert!(check_out >= check_in);
                prop_assert!(row.total_hours.is_some());
            } else {
                prop_assert!(row.total_hours.is_none());
            }
        }
    }

    #[test]
    fn prop_worked_hours_are_exact(hundredths in prop::collection::vec(1u32..1200, 1..10)) {
        let store = Arc::new(AttendanceStore::new());
        let tracker = tracker(store.clone());
        let rt = runtime();

        let mut expected_total = Decimal::ZERO;
        for (offset, h) in hundredths.iter().enumerate() {
            let start = day(offset as u32).and_hms_opt(6, 0, 0).unwrap();
            // 36 seconds is exactly 0.01 hours
            let end = start + Duration::seconds(i64::from(*h) * 36);

            rt.block_on(tracker.check_in(command(1, start))).unwrap();
            let row = rt.block_on(tracker.check_out(command(1, end))).unwrap();

            let expected = Decimal::new(i64::from(*h), 2);
            prop_assert_eq!(row.total_hours, Some(expected));
            expected_total += expected;
        }

        let range = DateRange::new(day(0), day(hundredths.len() as u32)).unwrap();
        let totals = aggregate_by_employee(store.in_range(range).iter(), &HashSet::new());
        prop_assert_eq!(totals[&1].total_hours, expected_total);
        prop_assert_eq!(totals[&1].worked_days as usize, hundredths.len());
    }

    #[test]
    fn prop_terminal_states_are_absorbing(ops in prop::collection::vec(request_op(), 1..12)) {
        let attendance = Arc::new(AttendanceStore::new());
        let workflow = RequestWorkflow::new(
            Arc::new(RequestStore::new()),
            attendance,
            Arc::new(InMemoryAuditSink::new()),
        );
        let owner = ActorContext::staff(1);
        let now = day(0).and_hms_opt(9, 0, 0).unwrap();

        let created = workflow
            .submit(
                &owner,
                Submission::Late(LateSubmission {
                    request_date: day(1),
                    expected_arrival_time: chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                    reason: "Train delay".to_string(),
                    proof_reference: None,
                }),
                now,
            )
            .unwrap();
        let id = created.request_id;

        let mut settled: Option<RequestStatus> = None;
        for op in ops {
            let result = match op {
                RequestOp::Approve => workflow.review(&ActorContext::admin(9), id, ReviewDecision::approve(), now),
                RequestOp::Reject => workflow.review(&ActorContext::admin(9), id, ReviewDecision::reject("no"), now),
                RequestOp::CancelByOwner => workflow.cancel(&owner, id, now),
                RequestOp::CancelByOther => workflow.cancel(&ActorContext::staff(2), id, now),
                RequestOp::ReviewByStaff => workflow.review(&owner, id, ReviewDecision::approve(), now),
            };

            match (settled, result) {
                (None, Ok(request)) => {
                    prop_assert!(request.status.is_terminal());
                    settled = Some(request.status);
                }
                (Some(_), Ok(request)) => {
                    prop_assert!(false, "request changed again: {:?}", request.status);
                }
                (_, Err(_)) => {}
            }

            let current = workflow.get(&owner, id).unwrap();
            match settled {
                Some(status) => {
                    prop_assert_eq!(current.status, status);
                    prop_assert_eq!(current.version, 2);
                }
                None => {
                    prop_assert_eq!(current.status, RequestStatus::Pending);
                    prop_assert_eq!(current.version, 1);
                }
            }
        }
    }
}
