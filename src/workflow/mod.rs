//! Overtime, leave and late request workflows.
//!
//! All three variants share one state machine:
//!
//! ```text
//!            +--review(approve)--> Approved
//!            |
//! Pending ---+--review(reject)---> Rejected
//!            |
//!            +--cancel(owner)----> Cancelled
//! ```
//!
//! Terminal states are absorbing. Approving overtime writes the granted
//! hours onto the day's attendance row; approving a late request links it
//! to the row so payroll can waive that day's deduction.

mod engine;
mod submission;

pub use engine::{RequestFilter, RequestWorkflow};
pub use submission::{
    LateSubmission, LeaveSubmission, OvertimeSubmission, ReviewDecision, Submission,
    ValidatedSubmission,
};
