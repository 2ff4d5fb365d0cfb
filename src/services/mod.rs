// Service exports
pub mod api;
pub mod postgres;

pub use api::{ApiClient, ApiError, DefaultHeaders};
pub use postgres::{read_pet, PetRepository, PostgresError};
