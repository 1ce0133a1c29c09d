pub mod advice;
pub mod aggregate;
pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod firestore;
pub mod models;
pub mod tracing_setup;

pub use config::CoreConfig;
pub use error::CoreError;
