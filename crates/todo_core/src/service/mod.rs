//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, repository calls and snapshots into use-case
//!   level APIs.
//! - Keep callers decoupled from storage details.

pub mod todo_service;
