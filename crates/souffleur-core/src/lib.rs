//! Souffleur Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the director
//! context, the sync scheduler and the API server depend on. It contains no
//! transport or I/O code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod connection;
pub mod error;
pub mod event;
pub mod process;
