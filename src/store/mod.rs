//! Concurrent in-memory stores for attendance rows and requests.
//!
//! When a request transition also touches attendance, the request lock is
//! always taken first.

mod attendance_store;
mod request_store;

pub use attendance_store::AttendanceStore;
pub use request_store::RequestStore;
