//! HTTP API route handlers.

pub mod movies;
pub mod system;
