//! Domain ports for the hexagonal boundary.
//!
//! Each repository trait is implemented by the Diesel adapters in
//! `outbound::persistence` and the in-process store in `outbound::memory`.

mod macros;
pub(crate) use macros::define_port_error;

mod admin_repository;
mod allocation_repository;
mod event_repository;
mod resource_repository;
mod token_repository;
mod user_repository;

#[cfg(test)]
pub use admin_repository::MockAdminRepository;
pub use admin_repository::{AdminRepository, AdminRepositoryError, StoreStats};
#[cfg(test)]
pub use allocation_repository::MockAllocationRepository;
pub use allocation_repository::{AllocationRepository, AllocationRepositoryError};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use resource_repository::MockResourceRepository;
pub use resource_repository::{ResourceRepository, ResourceRepositoryError};
#[cfg(test)]
pub use token_repository::MockTokenRepository;
pub use token_repository::{TokenRepository, TokenRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
