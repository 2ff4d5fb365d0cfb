use rand::Rng;
use std::ops::Range;

/// Range placeholder image ids are drawn from.
pub const PLACEHOLDER_IMAGE_IDS: Range<i32> = 9999..1_000_000;

/// Random image id for a pet that has none yet.
pub fn placeholder_image_id() -> i32 {
    rand::thread_rng().gen_range(PLACEHOLDER_IMAGE_IDS)
}

/// Image id to store for a pet: its own when set (`>= 1`), otherwise a
/// placeholder.
#[inline]
pub fn resolve_primary_image_id(primary_image_id: i32) -> i32 {
    if primary_image_id < 1 {
        placeholder_image_id()
    } else {
        primary_image_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigned_image_id_kept() {
        assert_eq!(resolve_primary_image_id(42), 42);
        assert_eq!(resolve_primary_image_id(1), 1);
    }

    #[test]
    fn test_missing_image_id_replaced() {
        for input in [0, -1, i32::MIN] {
            let id = resolve_primary_image_id(input);
            assert!(PLACEHOLDER_IMAGE_IDS.contains(&id), "{} out of range", id);
        }
    }
}
