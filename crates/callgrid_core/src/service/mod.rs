//! Use-case level services over the repositories.
//!
//! # Responsibility
//! - Compose per-kind repositories into cross-kind read paths.
//! - Keep CLI and other front ends decoupled from store wiring.

pub mod catalog;
pub mod resolver;

pub use catalog::Catalog;
pub use resolver::RelationshipResolver;
