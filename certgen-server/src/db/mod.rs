//! Database access layer for certgen-server

pub mod certificates;
pub mod events;
