// Unit tests for the pet search logic

use pet_match::core::filters::{apply_criteria, bound_parameter_count, build_filter_query, matches_criteria};
use pet_match::core::images::{resolve_primary_image_id, PLACEHOLDER_IMAGE_IDS};
use pet_match::models::{Pet, SearchCriteria};

fn create_test_pet(pet_id: i32, breed_id: i32, agency_id: i32, size_group: &str) -> Pet {
    Pet {
        pet_id,
        species_id: if breed_id < 100 { 1 } else { 2 },
        species: if breed_id < 100 { "Dog" } else { "Cat" }.to_string(),
        breed_id,
        breed: format!("Breed {}", breed_id),
        agency_id,
        primary_image_id: 1000 + pet_id,
        name: format!("Pet {}", pet_id),
        sex: if pet_id % 2 == 0 { "Female" } else { "Male" }.to_string(),
        age_group: "Young".to_string(),
        activity_level: "High".to_string(),
        exercise_needs: "Moderate".to_string(),
        owner_experience: "None".to_string(),
        size_group: size_group.to_string(),
        vocal_level: "Quiet".to_string(),
        ..Pet::default()
    }
}

fn create_shelter() -> Vec<Pet> {
    vec![
        create_test_pet(1, 10, 1, "Small"),
        create_test_pet(2, 10, 2, "Medium"),
        create_test_pet(3, 11, 1, "Large"),
        create_test_pet(4, 12, 2, "Small"),
        create_test_pet(5, 101, 1, "Small"),
        create_test_pet(6, 102, 3, "Medium"),
    ]
}

fn ids(pets: &[Pet]) -> Vec<i32> {
    pets.iter().map(|pet| pet.pet_id).collect()
}

#[test]
fn test_no_filters_returns_everything_not_liked() {
    let criteria = SearchCriteria::for_user(9);
    let result = apply_criteria(&create_shelter(), &criteria, &[2, 5]);

    assert_eq!(ids(&result), vec![1, 3, 4, 6]);
}

#[test]
fn test_empty_list_excludes_everything() {
    let criteria = SearchCriteria {
        size_groups: Some(vec![]),
        breed_ids: Some(vec![10, 11, 12]),
        ..SearchCriteria::for_user(9)
    };

    assert!(apply_criteria(&create_shelter(), &criteria, &[]).is_empty());
}

#[test]
fn test_list_filter_is_any_of() {
    let criteria = SearchCriteria {
        size_groups: Some(vec!["Small".to_string(), "Large".to_string()]),
        ..SearchCriteria::for_user(9)
    };

    let result = apply_criteria(&create_shelter(), &criteria, &[4]);
    assert_eq!(ids(&result), vec![1, 3, 5]);
}

#[test]
fn test_filters_combine_with_and() {
    let criteria = SearchCriteria {
        species_id: Some(1),
        agency_ids: Some(vec![1]),
        sex: Some("Male".to_string()),
        ..SearchCriteria::for_user(9)
    };

    let result = apply_criteria(&create_shelter(), &criteria, &[]);
    assert_eq!(ids(&result), vec![1, 3]);
}

#[test]
fn test_zero_species_imposes_nothing() {
    let criteria = SearchCriteria {
        species_id: Some(0),
        ..SearchCriteria::for_user(9)
    };

    assert_eq!(apply_criteria(&create_shelter(), &criteria, &[]).len(), 6);
}

#[test]
fn test_predicate_agrees_with_sql_shape() {
    let criteria = SearchCriteria {
        breed_ids: Some(vec![10, 101]),
        vocal_levels: Some(vec![]),
        ..SearchCriteria::for_user(9)
    };
    let builder = build_filter_query(&criteria);
    let sql = builder.sql();

    assert!(sql.contains("(1=0 OR pets.breed_id = $1 OR pets.breed_id = $2)"));
    assert!(sql.contains("AND (1=0) EXCEPT"));
    assert!(!matches_criteria(&create_test_pet(1, 10, 1, "Small"), &criteria));
}

#[test]
fn test_every_list_axis_emits_its_column() {
    let criteria = SearchCriteria {
        species_id: Some(1),
        breed_ids: Some(vec![1]),
        agency_ids: Some(vec![1]),
        sex: Some("Female".to_string()),
        age_groups: Some(vec!["Baby".to_string()]),
        activity_levels: Some(vec!["Low".to_string()]),
        all_exercise_needs: Some(vec!["Low".to_string()]),
        owner_experiences: Some(vec!["Dog".to_string()]),
        size_groups: Some(vec!["Small".to_string()]),
        vocal_levels: Some(vec!["Quiet".to_string()]),
        ..SearchCriteria::for_user(9)
    };
    let builder = build_filter_query(&criteria);
    let sql = builder.sql();

    for column in [
        "pets.species_id = $1",
        "pets.breed_id = $2",
        "pets.agency_id = $3",
        "pets.sex = $4",
        "pets.age_group = $5",
        "pets.activity_level = $6",
        "pets.exercise_needs = $7",
        "pets.owner_experience = $8",
        "pets.size_group = $9",
        "pets.vocal_level = $10",
        "user_pet.user_id = $11",
    ] {
        assert!(sql.contains(column), "missing {} in {}", column, sql);
    }
    assert_eq!(bound_parameter_count(&criteria), 11);
}

#[test]
fn test_placeholder_image_range() {
    let id = resolve_primary_image_id(0);
    assert!(PLACEHOLDER_IMAGE_IDS.contains(&id));
    assert_eq!(resolve_primary_image_id(12), 12);
}
