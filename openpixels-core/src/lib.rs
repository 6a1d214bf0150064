//! OpenPixels Core
//!
//! Wire types for the OpenPixels worker API.
//!
//! This crate contains:
//! - Domain types: status updates received while polling and the outcome they reduce to
//! - DTOs: request/response bodies of the auxiliary endpoints (submit, health)

pub mod domain;
pub mod dto;
