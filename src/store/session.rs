use crate::models::{Pet, SearchCriteria, User};
use crate::services::DefaultHeaders;
use crate::store::storage::{LocalStorage, StorageError};
use serde::Serialize;

/// Storage key holding the raw auth token
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-encoded user
pub const USER_KEY: &str = "user";

/// Client-side session and swipe state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub token: String,
    pub user: User,
    pub pets: Vec<Pet>,
    pub active_pet: Option<i32>,
    /// Liked pet ids in swipe order, duplicates kept
    pub matched_pets: Vec<i32>,
    /// Rejected pet ids in swipe order, duplicates kept
    pub rejected_pets: Vec<i32>,
    pub criteria: Option<SearchCriteria>,
}

/// A named state change, for callers that dispatch by value.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetAuthToken(String),
    SetUser(User),
    Logout,
    SetActivePet(i32),
    SetPets(Vec<Pet>),
    AddPet(Pet),
    UpdatePet(Pet),
    DeletePet(i32),
    UpdateCriteria(SearchCriteria),
    AddPetToMatched(i32),
    AddPetToRejected(i32),
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetAuthToken(_) => "SET_AUTH_TOKEN",
            Mutation::SetUser(_) => "SET_USER",
            Mutation::Logout => "LOGOUT",
            Mutation::SetActivePet(_) => "SET_ACTIVE_PET",
            Mutation::SetPets(_) => "SET_PETS",
            Mutation::AddPet(_) => "ADD_PET",
            Mutation::UpdatePet(_) => "UPDATE_PET",
            Mutation::DeletePet(_) => "DELETE_PET",
            Mutation::UpdateCriteria(_) => "UPDATE_CRITERIA",
            Mutation::AddPetToMatched(_) => "ADD_PET_TO_MATCHED",
            Mutation::AddPetToRejected(_) => "ADD_PET_TO_REJECTED",
        }
    }
}

/// Mutable session container.
///
/// Mutations assign fields directly and never validate. Only the token and
/// user reach durable storage; the token also drives the `Authorization`
/// default header shared with `ApiClient`.
pub struct SessionStore<S: LocalStorage> {
    state: SessionState,
    storage: S,
    headers: DefaultHeaders,
}

impl<S: LocalStorage> SessionStore<S> {
    /// Build the store from whatever token and user `storage` holds.
    pub fn restore(storage: S, headers: DefaultHeaders) -> Self {
        let token = storage.get_item(TOKEN_KEY);
        if let Some(token) = &token {
            headers.set_bearer(token);
        }

        let user = storage
            .get_item(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<Option<User>>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("Ignoring stored user that is not valid JSON: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        tracing::debug!(
            "Restored session (token: {}, user: {})",
            token.is_some(),
            user.username
        );

        Self {
            state: SessionState {
                token: token.unwrap_or_default(),
                user,
                ..SessionState::default()
            },
            storage,
            headers,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Apply one mutation
    pub fn commit(&mut self, mutation: Mutation) {
        tracing::debug!("commit {}", mutation.name());

        match mutation {
            Mutation::SetAuthToken(token) => self.set_auth_token(token),
            Mutation::SetUser(user) => self.set_user(user),
            Mutation::Logout => self.logout(),
            Mutation::SetActivePet(pet_id) => self.set_active_pet(pet_id),
            Mutation::SetPets(pets) => self.set_pets(pets),
            Mutation::AddPet(pet) => self.add_pet(pet),
            Mutation::UpdatePet(pet) => self.update_pet(pet),
            Mutation::DeletePet(pet_id) => self.delete_pet(pet_id),
            Mutation::UpdateCriteria(criteria) => self.update_criteria(criteria),
            Mutation::AddPetToMatched(pet_id) => self.add_pet_to_matched(pet_id),
            Mutation::AddPetToRejected(pet_id) => self.add_pet_to_rejected(pet_id),
        }
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        let token = token.into();

        let result = self.storage.set_item(TOKEN_KEY, &token);
        log_storage_failure(TOKEN_KEY, result);
        self.headers.set_bearer(&token);
        self.state.token = token;
    }

    pub fn set_user(&mut self, user: User) {
        match serde_json::to_string(&user) {
            Ok(json) => {
                let result = self.storage.set_item(USER_KEY, &json);
                log_storage_failure(USER_KEY, result);
            }
            Err(e) => tracing::warn!("Failed to encode user for storage: {}", e),
        }
        self.state.user = user;
    }

    pub fn logout(&mut self) {
        log_storage_failure(TOKEN_KEY, self.storage.remove_item(TOKEN_KEY));
        log_storage_failure(USER_KEY, self.storage.remove_item(USER_KEY));
        self.state.token.clear();
        self.state.user = User::default();
        self.headers.clear();
    }

    pub fn set_active_pet(&mut self, pet_id: i32) {
        self.state.active_pet = Some(pet_id);
    }

    pub fn set_pets(&mut self, pets: Vec<Pet>) {
        self.state.pets = pets;
    }

    pub fn add_pet(&mut self, pet: Pet) {
        self.state.pets.push(pet);
    }

    /// Replace the pet with the same id; the edited pet moves to the end.
    pub fn update_pet(&mut self, pet: Pet) {
        self.state.pets.retain(|existing| existing.pet_id != pet.pet_id);
        self.state.pets.push(pet);
    }

    pub fn delete_pet(&mut self, pet_id: i32) {
        self.state.pets.retain(|pet| pet.pet_id != pet_id);
    }

    pub fn update_criteria(&mut self, criteria: SearchCriteria) {
        self.state.criteria = Some(criteria);
    }

    pub fn add_pet_to_matched(&mut self, pet_id: i32) {
        self.state.matched_pets.push(pet_id);
        tracing::debug!("Matched pets: {:?}", self.state.matched_pets);
    }

    pub fn add_pet_to_rejected(&mut self, pet_id: i32) {
        self.state.rejected_pets.push(pet_id);
        tracing::debug!("Rejected pets: {:?}", self.state.rejected_pets);
    }
}

fn log_storage_failure(key: &str, result: Result<(), StorageError>) {
    if let Err(e) = result {
        tracing::warn!("Failed to persist session key {}: {}", key, e);
    }
}
