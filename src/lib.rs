//! Attendance, request approval and payroll engine.
//!
//! This crate tracks daily check-ins and check-outs, runs the overtime,
//! leave and late-arrival request workflow, and computes salaries from the
//! accumulated attendance.
//!
//! - [`attendance`]: the per-day check-in/check-out state machine
//! - [`workflow`]: the Pending → Approved/Rejected/Cancelled request lifecycle
//! - [`calculation`]: payroll aggregation and pricing
//! - [`api`]: the axum HTTP surface over all three

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;
