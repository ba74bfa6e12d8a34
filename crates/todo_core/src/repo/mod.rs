//! Repository layer over the embedded store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Map generic tabular results into typed records.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to storage errors.

pub mod mapper;
pub mod todo_repo;
