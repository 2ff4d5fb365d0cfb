//! Pet Match - data layer and session store for a pet adoption app
//!
//! The data layer reads and writes pets in PostgreSQL and runs the filtered
//! "swipe deck" search, which leaves out pets the user already liked. The
//! session store keeps the client's auth token, user, pet list and swipe
//! history, persisting the token and user to durable storage.

pub mod config;
pub mod core;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use crate::core::{build_filter_query, matches_criteria};
pub use models::{Pet, SearchCriteria, User};
pub use services::{ApiClient, DefaultHeaders, PetRepository};
pub use store::{FileStorage, MemoryStorage, Mutation, SessionStore};
