//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog service.
//! This crate contains the entities, the visibility and ownership rules, and the
//! ports that storage and authentication backends implement. It has no
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod validation;

pub use error::DomainError;

/// Number of posts on one page of any feed.
pub const POSTS_PER_PAGE: u64 = 10;
