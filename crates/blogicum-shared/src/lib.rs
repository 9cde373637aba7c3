//! # Blogicum Shared
//!
//! Wire types of the blog API: request bodies for authentication and the JSON
//! shapes every page responds with.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
