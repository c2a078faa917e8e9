//! API route handlers

pub mod domains;
pub mod health;
pub mod sessions;
