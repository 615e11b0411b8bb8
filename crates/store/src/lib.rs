//! In-memory collaborators for the schedule engine: slot storage with
//! term-scoped transactions, catalogs loaded from a JSON snapshot, and audit
//! sinks.

pub mod audit;
pub mod catalog;
pub mod repository;

pub use audit::{AuditEntry, MemoryAudit, TracingAudit};
pub use catalog::{CatalogSnapshot, InMemCatalog, LoadError};
pub use repository::InMemSchedule;
