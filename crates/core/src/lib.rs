//! `forgeline-core`: shared building blocks for the scheduling workspace.
//!
//! This crate contains **pure** primitives (no IO, no runtime): identifiers,
//! the entity marker trait and the domain error model.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{JobId, MachineId, RunId};
