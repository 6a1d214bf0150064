//! Data Transfer Objects for the worker API
//!
//! Bodies exchanged with the worker that are not part of the polling protocol itself.

pub mod health;
pub mod job;
