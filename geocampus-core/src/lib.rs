//! Core domain types for the GeoCampus toolchain.
//!
//! Responsibilities:
//! - Define the persisted campus entities and the whole-document state.
//! - Define the `CampusStore` persistence contract.
//!
//! Boundaries:
//! - No I/O here beyond the store trait; concrete backends live in
//!   `geocampus-data`.
//! - No import or extraction rules (live in `geocampus-data`).

#![forbid(unsafe_code)]

mod entity;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use entity::{Bathroom, Building, CampusState, Faculty, Floor, Room, Tags};
pub use store::{CampusStore, CampusStoreError};

#[cfg(any(test, feature = "test-support"))]
pub use test_support::InMemoryStore;
