//! Application services for the director context.

pub mod command_handlers;
pub mod marker_relay;
pub mod query_handlers;
