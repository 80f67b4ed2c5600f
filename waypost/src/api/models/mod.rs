//! API request and response data models.
//!
//! These models define the public API contract; they are distinct from the
//! wire types the store module sends to GitHub.

pub mod markers;
