//! Lakeside Core - Shared domain types.
//!
//! This crate provides the types used by every Lakeside Farms component:
//! - `site` - Public marketing pages and the `/admin` content panel
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP. Database encoding is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, ratings, coordinates, usernames, and contact messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
