//! HTTP API module for the attendance engine.
//!
//! This module exposes check-in/check-out, the request workflow and payroll
//! runs as JSON endpoints. The caller's identity is taken from the
//! `X-Actor-Id` and `X-Actor-Role` headers.

mod actor;
mod handlers;
mod request;
mod response;
mod state;

pub use actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, Actor};
pub use handlers::create_router;
pub use request::{CheckpointRequest, EvidencePayload, HistoryParams, PayrollRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::{AppState, Clock};
