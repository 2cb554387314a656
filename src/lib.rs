//! Library entry for piptui exposing the core logic for integration tests.

pub mod app;
pub mod error;
pub mod events;
pub mod logic;
pub mod pip;
pub mod pypi;
pub mod registry;
pub mod search;
pub mod state;
pub mod theme;
pub mod ui;
