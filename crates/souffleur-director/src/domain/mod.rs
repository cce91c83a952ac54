//! Domain model for the director context.

pub mod aggregates;
pub mod commands;
pub mod credential;
pub mod directory;
pub mod events;
pub mod notifications;
pub mod registry;
pub mod stage;
