use crate::config::DatabaseSettings;
use crate::core::filters::{bound_parameter_count, build_filter_query, PET_PROJECTION, PET_SOURCE};
use crate::core::images::resolve_primary_image_id;
use crate::models::{Pet, SearchCriteria};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

const INSERT_PET: &str = r#"
    INSERT INTO pets (species_id, breed_id, agency_id, primary_image_id, primary_image_url,
        thumbnail_url, name, description_text, sex, age_group, age_string, activity_level,
        exercise_needs, owner_experience, size_group, vocal_level)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
    RETURNING pet_id
"#;

const UPDATE_PET: &str = r#"
    UPDATE pets SET species_id = $1, breed_id = $2, agency_id = $3, primary_image_id = $4,
        primary_image_url = $5, thumbnail_url = $6, name = $7, description_text = $8, sex = $9,
        age_group = $10, age_string = $11, activity_level = $12, exercise_needs = $13,
        owner_experience = $14, size_group = $15, vocal_level = $16
    WHERE pet_id = $17
"#;

const DELETE_PET: &str = "DELETE FROM pets WHERE pet_id = $1";

const INSERT_LIKE: &str = r#"
    INSERT INTO user_pet (user_id, pet_id)
    VALUES ($1, $2)
    ON CONFLICT (user_id, pet_id) DO NOTHING
"#;

/// Data access for pets and the user/pet like relation.
///
/// Every public operation runs a single statement. Failures are logged and
/// turned into an empty value (`Pet::default()`, an empty list, `false`),
/// so callers cannot tell "not found" from "database down". The `try_*`
/// variants return the underlying error instead.
#[derive(Clone)]
pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    /// Create a new repository from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new repository from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections
        );

        Self::new(
            &settings.url,
            settings.max_connections,
            settings.min_connections,
            Duration::from_secs(settings.acquire_timeout_secs),
            Duration::from_secs(settings.idle_timeout_secs),
        )
        .await
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema in `migrations/`
    pub async fn run_migrations(&self) -> Result<(), PostgresError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Insert a pet. Returns `true` when a row was written.
    ///
    /// A `primary_image_id` below 1 is replaced with a random placeholder.
    pub async fn add_pet(&self, pet: &Pet) -> bool {
        match self.try_add_pet(pet).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to add pet {:?}: {}", pet.name, e);
                false
            }
        }
    }

    /// Insert a pet and return its new id
    pub async fn try_add_pet(&self, pet: &Pet) -> Result<i32, PostgresError> {
        let row = bind_pet(sqlx::query(INSERT_PET), pet)
            .fetch_one(&self.pool)
            .await?;
        let pet_id: i32 = row.try_get("pet_id")?;

        tracing::debug!("Added pet {} ({})", pet_id, pet.name);

        Ok(pet_id)
    }

    /// Fetch one pet, or the empty pet when it does not exist
    pub async fn get_pet(&self, pet_id: i32) -> Pet {
        self.try_get_pet(pet_id)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Failed to fetch pet {}: {}", pet_id, e);
                None
            })
            .unwrap_or_default()
    }

    pub async fn try_get_pet(&self, pet_id: i32) -> Result<Option<Pet>, PostgresError> {
        let query = format!("SELECT {PET_PROJECTION} {PET_SOURCE} WHERE pets.pet_id = $1");

        let row = sqlx::query(&query)
            .bind(pet_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(read_pet).transpose()?)
    }

    /// Fetch every pet, grouped by agency
    pub async fn get_all_pets(&self) -> Vec<Pet> {
        self.try_get_all_pets().await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch pets: {}", e);
            Vec::new()
        })
    }

    pub async fn try_get_all_pets(&self) -> Result<Vec<Pet>, PostgresError> {
        let query = format!("SELECT {PET_PROJECTION} {PET_SOURCE} ORDER BY pets.agency_id, pets.pet_id");

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        read_pets(&rows)
    }

    /// Fetch the pets a user has liked
    pub async fn get_liked_pets(&self, user_id: i32) -> Vec<Pet> {
        self.try_get_liked_pets(user_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch liked pets for user {}: {}", user_id, e);
            Vec::new()
        })
    }

    pub async fn try_get_liked_pets(&self, user_id: i32) -> Result<Vec<Pet>, PostgresError> {
        let query = format!(
            "SELECT {PET_PROJECTION} {PET_SOURCE} \
             JOIN user_pet ON user_pet.pet_id = pets.pet_id \
             JOIN users ON users.user_id = user_pet.user_id \
             WHERE users.user_id = $1 \
             ORDER BY pets.pet_id"
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        tracing::debug!("User {} has liked {} pets", user_id, rows.len());

        read_pets(&rows)
    }

    /// Search pets by `criteria`, leaving out pets the user already liked
    pub async fn get_filtered_pets(&self, criteria: &SearchCriteria) -> Vec<Pet> {
        self.try_get_filtered_pets(criteria).await.unwrap_or_else(|e| {
            tracing::error!("Failed to search pets for user {}: {}", criteria.user_id, e);
            Vec::new()
        })
    }

    pub async fn try_get_filtered_pets(&self, criteria: &SearchCriteria) -> Result<Vec<Pet>, PostgresError> {
        let mut builder = build_filter_query(criteria);

        tracing::debug!(
            "Searching pets for user {} with {} bound parameters",
            criteria.user_id,
            bound_parameter_count(criteria)
        );

        let rows = builder.build().fetch_all(&self.pool).await?;

        tracing::debug!("Search for user {} returned {} pets", criteria.user_id, rows.len());

        read_pets(&rows)
    }

    /// Overwrite the pet with `pet.pet_id`. Returns `false` if no such pet.
    pub async fn update_pet(&self, pet: &Pet) -> bool {
        self.try_update_pet(pet).await.unwrap_or_else(|e| {
            tracing::error!("Failed to update pet {}: {}", pet.pet_id, e);
            false
        })
    }

    pub async fn try_update_pet(&self, pet: &Pet) -> Result<bool, PostgresError> {
        let result = bind_pet(sqlx::query(UPDATE_PET), pet)
            .bind(pet.pet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a pet. Returns `false` if no such pet.
    pub async fn delete_pet(&self, pet_id: i32) -> bool {
        self.try_delete_pet(pet_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to delete pet {}: {}", pet_id, e);
            false
        })
    }

    pub async fn try_delete_pet(&self, pet_id: i32) -> Result<bool, PostgresError> {
        let result = sqlx::query(DELETE_PET)
            .bind(pet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record that a user liked a pet, hiding it from their later searches.
    ///
    /// Returns `false` if the like already existed.
    pub async fn like_pet(&self, user_id: i32, pet_id: i32) -> bool {
        self.try_like_pet(user_id, pet_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to record like {} -> {}: {}", user_id, pet_id, e);
            false
        })
    }

    pub async fn try_like_pet(&self, user_id: i32, pet_id: i32) -> Result<bool, PostgresError> {
        let result = sqlx::query(INSERT_LIKE)
            .bind(user_id)
            .bind(pet_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Recorded like: {} -> {}", user_id, pet_id);

        Ok(result.rows_affected() > 0)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Bind the sixteen writable pet columns, in `INSERT_PET` order.
fn bind_pet<'q>(
    query: Query<'q, Postgres, PgArguments>,
    pet: &'q Pet,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(pet.species_id)
        .bind(pet.breed_id)
        .bind(pet.agency_id)
        .bind(resolve_primary_image_id(pet.primary_image_id))
        .bind(pet.primary_image_url.as_str())
        .bind(pet.thumbnail_url.as_str())
        .bind(pet.name.as_str())
        .bind(pet.description_text.as_str())
        .bind(pet.sex.as_str())
        .bind(pet.age_group.as_str())
        .bind(pet.age_string.as_str())
        .bind(pet.activity_level.as_str())
        .bind(pet.exercise_needs.as_str())
        .bind(pet.owner_experience.as_str())
        .bind(pet.size_group.as_str())
        .bind(pet.vocal_level.as_str())
}

/// Map one result row onto a `Pet`.
///
/// Fails with `ColumnNotFound` if the row lacks a pet column; `NULL` text
/// reads as an empty string.
pub fn read_pet(row: &PgRow) -> Result<Pet, sqlx::Error> {
    Ok(Pet {
        pet_id: row.try_get("pet_id")?,
        species_id: row.try_get("species_id")?,
        species: text(row, "species_name")?,
        breed_id: row.try_get("breed_id")?,
        breed: text(row, "breed_name")?,
        agency_id: row.try_get("agency_id")?,
        primary_image_id: row.try_get("primary_image_id")?,
        primary_image_url: text(row, "primary_image_url")?,
        thumbnail_url: text(row, "thumbnail_url")?,
        name: text(row, "name")?,
        description_text: text(row, "description_text")?,
        sex: text(row, "sex")?,
        age_group: text(row, "age_group")?,
        age_string: text(row, "age_string")?,
        activity_level: text(row, "activity_level")?,
        exercise_needs: text(row, "exercise_needs")?,
        owner_experience: text(row, "owner_experience")?,
        size_group: text(row, "size_group")?,
        vocal_level: text(row, "vocal_level")?,
    })
}

fn text(row: &PgRow, column: &str) -> Result<String, sqlx::Error> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

fn read_pets(rows: &[PgRow]) -> Result<Vec<Pet>, PostgresError> {
    rows.iter()
        .map(read_pet)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_update_bind_same_columns() {
        let placeholders = |sql: &str| sql.matches('$').count();

        assert_eq!(placeholders(INSERT_PET), 16);
        assert_eq!(placeholders(UPDATE_PET), 17);
        assert!(UPDATE_PET.trim_end().ends_with("WHERE pet_id = $17"));
    }

    #[test]
    fn test_error_display() {
        let err = PostgresError::from(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("SQLx error"));
    }
}
