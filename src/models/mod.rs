// Model exports
pub mod domain;
pub mod requests;

pub use domain::{Pet, User};
pub use requests::SearchCriteria;
