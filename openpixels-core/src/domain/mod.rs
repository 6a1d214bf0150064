//! Core domain types
//!
//! These types describe what the worker reports about a job while it runs.
//! They are shared by every client flavour (async and blocking).

pub mod job;
