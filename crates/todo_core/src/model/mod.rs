//! Todo domain model and operation inputs.
//!
//! # Responsibility
//! - Define the canonical `Todo` record shared by repository and services.
//! - Define request shapes and their field-level validation.
//!
//! # Invariants
//! - Every stored record satisfies the constraints in [`validation`].

pub mod request;
pub mod todo;
pub mod validation;
