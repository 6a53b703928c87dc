//! Core types for Lakeside Farms.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod coordinates;
pub mod id;
pub mod initials;
pub mod rating;
pub mod username;

pub use contact::{ContactError, ContactMessage};
pub use coordinates::{Coordinates, CoordinatesError};
pub use id::*;
pub use initials::initials;
pub use rating::Rating;
pub use username::{Username, UsernameError};
