// Criterion benchmarks for the pet search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pet_match::core::filters::{apply_criteria, build_filter_query};
use pet_match::models::{Pet, SearchCriteria};

const SIZE_GROUPS: [&str; 4] = ["Small", "Medium", "Large", "Extra Large"];

fn create_pet(id: usize) -> Pet {
    Pet {
        pet_id: id as i32,
        species_id: 1 + (id % 2) as i32,
        breed_id: (id % 40) as i32,
        agency_id: (id % 25) as i32,
        primary_image_id: id as i32,
        name: format!("Pet {}", id),
        sex: if id % 2 == 0 { "Female" } else { "Male" }.to_string(),
        age_group: "Young".to_string(),
        size_group: SIZE_GROUPS[id % SIZE_GROUPS.len()].to_string(),
        ..Pet::default()
    }
}

fn create_criteria(list_len: usize) -> SearchCriteria {
    SearchCriteria {
        species_id: Some(1),
        breed_ids: Some((0..list_len as i32).collect()),
        agency_ids: Some((0..list_len as i32).collect()),
        size_groups: Some(SIZE_GROUPS.iter().take(2).map(|s| s.to_string()).collect()),
        ..SearchCriteria::for_user(1)
    }
}

fn bench_build_filter_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_filter_query");

    for list_len in [1, 10, 100].iter() {
        let criteria = create_criteria(*list_len);

        group.bench_with_input(BenchmarkId::from_parameter(list_len), list_len, |b, _| {
            b.iter(|| {
                let builder = build_filter_query(black_box(&criteria));
                black_box(builder.sql().len())
            });
        });
    }

    group.finish();
}

fn bench_apply_criteria(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_criteria");
    let criteria = create_criteria(20);

    for size in [100, 1000, 10000].iter() {
        let pets: Vec<Pet> = (0..*size).map(create_pet).collect();
        let liked: Vec<i32> = (0..*size as i32).step_by(7).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| apply_criteria(black_box(&pets), black_box(&criteria), black_box(&liked)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_filter_query, bench_apply_criteria);
criterion_main!(benches);
