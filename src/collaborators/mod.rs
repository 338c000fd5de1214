//! Seams to the systems around the engine.
//!
//! Photo storage, reverse geocoding, the audit trail and employee master
//! data are owned elsewhere. The engine talks to them through the traits in
//! this module; the in-memory implementations back the HTTP binary and the
//! tests.

mod audit_sink;
mod directory;
mod evidence;
mod geocoder;

pub use audit_sink::{AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use directory::{EmployeeDirectory, InMemoryDirectory};
pub use evidence::{EvidenceStore, EvidenceUpload, InMemoryEvidenceStore};
pub use geocoder::{NoopGeocoder, ReverseGeocoder, StaticGeocoder, resolve_address};
