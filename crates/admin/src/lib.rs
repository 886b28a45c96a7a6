//! Atelier admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod routes;
pub mod state;
