use serde::{Deserialize, Serialize};
use validator::Validate;

/// Criteria for a filtered pet search.
///
/// Every list filter is three-valued:
/// - `None`: no constraint on that attribute
/// - `Some(vec![])`: nothing passes on that attribute
/// - `Some(values)`: the attribute must equal one of `values`
///
/// `species_id` of `None` or `0` means "any species", since clients send
/// an unset integer as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[validate(range(min = 1))]
    pub user_id: i32,
    #[serde(default)]
    pub species_id: Option<i32>,
    #[serde(default)]
    pub breed_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub agency_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub age_groups: Option<Vec<String>>,
    #[serde(default)]
    pub activity_levels: Option<Vec<String>>,
    #[serde(default)]
    pub all_exercise_needs: Option<Vec<String>>,
    #[serde(default)]
    pub owner_experiences: Option<Vec<String>>,
    #[serde(default)]
    pub size_groups: Option<Vec<String>>,
    #[serde(default)]
    pub vocal_levels: Option<Vec<String>>,
}

impl SearchCriteria {
    /// Criteria with no filters: every pet the user has not liked.
    pub fn for_user(user_id: i32) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// The species filter, if one is actually set.
    pub fn species_filter(&self) -> Option<i32> {
        self.species_id.filter(|id| *id != 0)
    }
}
