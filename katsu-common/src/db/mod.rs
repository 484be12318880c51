//! Database initialization, models and helpers

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;
