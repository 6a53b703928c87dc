//! Domain models for the site.
//!
//! Models are what services and templates work with; database row types are
//! private to the `db` module and converted into these.

pub mod admin;
pub mod branch;
pub mod content;
pub mod media;
pub mod news;
pub mod offer;
pub mod service;
pub mod team;
pub mod testimonial;
