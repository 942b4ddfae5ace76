#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case(1)]
#[test_case(2)]
#[test_case(3)]
#[test_case(16)]
fn map_ordered___any_worker_count___preserves_order(jobs: usize) {
    let items: Vec<u32> = (0..37).collect();

    let doubled = map_ordered(&items, jobs, |n| n * 2);

    assert_eq!(doubled, items.iter().map(|n| n * 2).collect::<Vec<_>>());
}

#[test]
fn map_ordered___empty_input___returns_empty() {
    let items: Vec<u32> = Vec::new();

    let result = map_ordered(&items, 4, |n| *n);

    assert!(result.is_empty());
}

#[test]
fn map_ordered___runs_on_multiple_threads() {
    let items: Vec<u32> = (0..8).collect();

    let threads = map_ordered(&items, 4, |_| std::thread::current().id());
    let distinct: std::collections::HashSet<_> = threads.into_iter().collect();

    assert!(distinct.len() > 1);
}

#[test]
#[should_panic(expected = "boom")]
fn map_ordered___worker_panic___propagates() {
    let items: Vec<u32> = (0..4).collect();

    map_ordered(&items, 2, |n| {
        if *n == 3 {
            panic!("boom");
        }
        *n
    });
}

#[test]
fn resolve_jobs___explicit_value___is_kept() {
    assert_eq!(resolve_jobs(3), 3);
}

#[test]
fn resolve_jobs___zero___uses_available_parallelism() {
    assert!(resolve_jobs(0) >= 1);
}
