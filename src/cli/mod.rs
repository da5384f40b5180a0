//! Command implementations and terminal presentation

pub mod setup;
pub mod summary;
pub mod ui;
