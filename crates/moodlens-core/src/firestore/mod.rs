pub mod client;
pub mod value;

pub use client::FirestoreClient;
pub use value::{Document, Value};
