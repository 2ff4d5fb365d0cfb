// Core query logic exports
pub mod filters;
pub mod images;

pub use filters::{apply_criteria, bound_parameter_count, build_filter_query, exclude_liked, matches_criteria};
pub use images::{placeholder_image_id, resolve_primary_image_id};
