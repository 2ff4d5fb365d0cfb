use crate::models::{Pet, SearchCriteria};
use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// Columns every pet query selects, in the shape `read_pet` expects.
pub const PET_PROJECTION: &str = "pets.pet_id, pets.species_id, species.name AS species_name, \
    pets.breed_id, breeds.name AS breed_name, pets.agency_id, pets.primary_image_id, \
    pets.primary_image_url, pets.thumbnail_url, pets.name, pets.description_text, pets.sex, \
    pets.age_group, pets.age_string, pets.activity_level, pets.exercise_needs, \
    pets.owner_experience, pets.size_group, pets.vocal_level";

/// Pets joined with their species and breed names.
pub const PET_SOURCE: &str = "FROM pets \
    JOIN species ON species.species_id = pets.species_id \
    JOIN breeds ON breeds.breed_id = pets.breed_id";

/// Build the filtered-search statement for `criteria`.
///
/// Filters are ANDed across categories and ORed within a list. Each value
/// is bound as its own parameter. A list given as `Some(vec![])` still
/// emits its `(1=0)` group, so that axis matches nothing; `None` emits
/// nothing. Pets the user already liked are removed with `EXCEPT`.
pub fn build_filter_query(criteria: &SearchCriteria) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {PET_PROJECTION} {PET_SOURCE} WHERE 1=1"));

    if let Some(species_id) = criteria.species_filter() {
        builder.push(" AND pets.species_id = ").push_bind(species_id);
    }
    push_any_of(&mut builder, "pets.breed_id", &criteria.breed_ids);
    push_any_of(&mut builder, "pets.agency_id", &criteria.agency_ids);
    if let Some(sex) = &criteria.sex {
        builder.push(" AND pets.sex = ").push_bind(sex.clone());
    }
    push_any_of(&mut builder, "pets.age_group", &criteria.age_groups);
    push_any_of(&mut builder, "pets.activity_level", &criteria.activity_levels);
    push_any_of(&mut builder, "pets.exercise_needs", &criteria.all_exercise_needs);
    push_any_of(&mut builder, "pets.owner_experience", &criteria.owner_experiences);
    push_any_of(&mut builder, "pets.size_group", &criteria.size_groups);
    push_any_of(&mut builder, "pets.vocal_level", &criteria.vocal_levels);

    builder
        .push(format!(
            " EXCEPT SELECT {PET_PROJECTION} {PET_SOURCE} \
             JOIN user_pet ON user_pet.pet_id = pets.pet_id \
             JOIN users ON users.user_id = user_pet.user_id \
             WHERE user_pet.user_id = "
        ))
        .push_bind(criteria.user_id)
        .push(" ORDER BY pet_id");

    builder
}

/// Append `AND (1=0 OR column = $n ...)` for a present list filter.
fn push_any_of<T>(builder: &mut QueryBuilder<'static, Postgres>, column: &str, values: &Option<Vec<T>>)
where
    T: Clone + Encode<'static, Postgres> + Type<Postgres> + 'static,
{
    let Some(values) = values else {
        return;
    };

    builder.push(" AND (1=0");
    for value in values {
        builder.push(" OR ").push(column).push(" = ").push_bind(value.clone());
    }
    builder.push(")");
}

/// Number of parameters `build_filter_query` binds for `criteria`.
pub fn bound_parameter_count(criteria: &SearchCriteria) -> usize {
    fn len<T>(values: &Option<Vec<T>>) -> usize {
        values.as_ref().map_or(0, Vec::len)
    }

    1 + usize::from(criteria.species_filter().is_some())
        + usize::from(criteria.sex.is_some())
        + len(&criteria.breed_ids)
        + len(&criteria.agency_ids)
        + len(&criteria.age_groups)
        + len(&criteria.activity_levels)
        + len(&criteria.all_exercise_needs)
        + len(&criteria.owner_experiences)
        + len(&criteria.size_groups)
        + len(&criteria.vocal_levels)
}

/// In-memory form of the filter part of `build_filter_query`.
#[inline]
pub fn matches_criteria(pet: &Pet, criteria: &SearchCriteria) -> bool {
    if let Some(species_id) = criteria.species_filter() {
        if pet.species_id != species_id {
            return false;
        }
    }

    if let Some(sex) = &criteria.sex {
        if &pet.sex != sex {
            return false;
        }
    }

    any_of(&criteria.breed_ids, &pet.breed_id)
        && any_of(&criteria.agency_ids, &pet.agency_id)
        && any_of(&criteria.age_groups, &pet.age_group)
        && any_of(&criteria.activity_levels, &pet.activity_level)
        && any_of(&criteria.all_exercise_needs, &pet.exercise_needs)
        && any_of(&criteria.owner_experiences, &pet.owner_experience)
        && any_of(&criteria.size_groups, &pet.size_group)
        && any_of(&criteria.vocal_levels, &pet.vocal_level)
}

#[inline]
fn any_of<T: PartialEq>(values: &Option<Vec<T>>, value: &T) -> bool {
    match values {
        None => true,
        Some(values) => values.contains(value),
    }
}

/// Drop pets whose id is in `liked_pet_ids`.
pub fn exclude_liked(pets: Vec<Pet>, liked_pet_ids: &[i32]) -> Vec<Pet> {
    pets.into_iter()
        .filter(|pet| !liked_pet_ids.contains(&pet.pet_id))
        .collect()
}

/// Filter, exclude liked pets and order by id, like the SQL statement does.
pub fn apply_criteria(pets: &[Pet], criteria: &SearchCriteria, liked_pet_ids: &[i32]) -> Vec<Pet> {
    let matching: Vec<Pet> = pets
        .iter()
        .filter(|pet| matches_criteria(pet, criteria))
        .cloned()
        .collect();

    let mut result = exclude_liked(matching, liked_pet_ids);
    result.sort_by_key(|pet| pet.pet_id);
    result.dedup_by_key(|pet| pet.pet_id);
    result
}
