use serde::{Deserialize, Serialize};

/// Adoptable pet as stored in the `pets` table, joined with its species
/// and breed names.
///
/// Every field is a flat scalar. `Pet::default()` is the "empty" pet the
/// repository hands back when a lookup finds nothing (or fails).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pet {
    pub pet_id: i32,
    pub species_id: i32,
    pub species: String,
    pub breed_id: i32,
    pub breed: String,
    pub agency_id: i32,
    pub primary_image_id: i32,
    pub primary_image_url: String,
    pub thumbnail_url: String,
    pub name: String,
    pub description_text: String,
    pub sex: String,
    pub age_group: String,
    pub age_string: String,
    pub activity_level: String,
    pub exercise_needs: String,
    pub owner_experience: String,
    pub size_group: String,
    pub vocal_level: String,
}

impl Pet {
    /// True for the placeholder returned by a lookup that found nothing.
    pub fn is_empty(&self) -> bool {
        self.pet_id == 0
    }
}

/// Logged-in user as kept by the client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

impl User {
    pub fn is_anonymous(&self) -> bool {
        self.user_id == 0 && self.username.is_empty()
    }
}
