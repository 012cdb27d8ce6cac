//! Per-kind repositories over the store gateway.
//!
//! # Responsibility
//! - Provide Add / GetBy<key> / ListAll (/ Delete) entry points per kind.
//! - Route every natural-keyed Add through the [`UniquenessGuard`].
//!
//! # Invariants
//! - Add copies only caller-owned fields into a fresh record; ids and
//!   timestamps supplied by the caller are ignored.
//! - "Nothing matched" is an empty `Vec`, never an error.
//!
//! [`UniquenessGuard`]: crate::guard::UniquenessGuard

pub mod action_repo;
pub mod assignment_repo;
pub mod callpoint_repo;
pub mod device_repo;
pub mod event_repo;
pub mod notification_repo;

pub use action_repo::ActionRepository;
pub use assignment_repo::AssignmentRepository;
pub use callpoint_repo::CallpointRepository;
pub use device_repo::DeviceRepository;
pub use event_repo::EventRepository;
pub use notification_repo::NotificationRepository;
