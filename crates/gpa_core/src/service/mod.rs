//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory app state and apply user actions to it.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod gpa_service;
