//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: a process-local store used when no database is configured
//!   and by the integration tests
//!
//! Adapters translate between domain types and storage representations and
//! carry no business rules beyond the per-resource allocation lock.

pub mod memory;
pub mod persistence;
