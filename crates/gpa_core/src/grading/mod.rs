//! Grade point math.
//!
//! # Responsibility
//! - Map letter grades to points under a selectable scale (`registry`).
//! - Aggregate credit-weighted GPAs over course lists (`gpa`).
//!
//! # Invariants
//! - Everything here is pure: no storage, no logging of user text.

pub mod gpa;
pub mod registry;
