//! Domain model module declarations.

pub mod advisory;
pub mod chat;
pub mod state;
pub mod ticket;
