//! Domain model for courses, grade scales and user preferences.
//!
//! # Responsibility
//! - Define the serialized shapes persisted in the key-value store.
//! - Own input validation for user-submitted forms.
//!
//! # Invariants
//! - Every course keeps the `CourseId` it was created with.
//! - Course grades are stored uppercased.
//! - Built-in scales are immutable constants; only custom scales are stored.

pub mod course;
pub mod numeric;
pub mod preferences;
pub mod scale;
pub mod theme;
