//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the booking repository ports backed by
//! PostgreSQL through `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. Business rules stay in the domain services, with one
//!   exception: the allocation write path serializes per resource here.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database errors map onto each port's error
//!   enum.
//!
//! # Example
//!
//! ```ignore
//! use booking::outbound::persistence::{DbPool, DieselEventRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/booking")).await?;
//! let events = DieselEventRepository::new(pool);
//! ```

mod diesel_admin_repository;
mod diesel_allocation_repository;
mod diesel_basic_error_mapping;
mod diesel_event_repository;
mod diesel_resource_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_admin_repository::DieselAdminRepository;
pub use diesel_allocation_repository::DieselAllocationRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_resource_repository::DieselResourceRepository;
pub use diesel_user_repository::{DieselTokenRepository, DieselUserRepository};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
