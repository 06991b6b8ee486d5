//! Client side of the authenticated REST backend.

mod backend;
mod client;

pub use backend::{Backend, RemoteReview, RemoteSession};
pub use client::ApiClient;
