//! Database entities

pub mod placeholder;
