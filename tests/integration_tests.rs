// Integration tests for Mentor Match

use mentor_match::config::AttributeConfig;
use mentor_match::core::{
    distribute_capacity, project, rng_from_seed, AttributeSchema, CompatibilityMatrix,
    HungarianSolver, MatchMaker, MatchingSolver, SlotGraph, SlotPair,
};
use mentor_match::error::MatchError;
use mentor_match::models::{Cohorts, Participant, Role};
use mentor_match::services::{DisabledEmbedder, HashingEmbedder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

fn column(name: &str, kind: &str, weight: Option<u32>) -> AttributeConfig {
    AttributeConfig {
        name: name.to_string(),
        kind: kind.to_string(),
        weight,
        rule: None,
        reference: None,
    }
}

fn course_schema() -> AttributeSchema {
    AttributeSchema::from_columns(&[
        column("id", "uuid", None),
        column("role", "role", None),
        column("course", "binary", Some(1)),
    ])
    .unwrap()
}

fn record(id: &str, role: &str, answers: Value) -> Map<String, Value> {
    let mut map = match answers {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert("id".to_string(), json!(id));
    map.insert("role".to_string(), json!(role));
    map
}

fn matchmaker(schema: AttributeSchema, max_connections: usize) -> MatchMaker {
    MatchMaker::new(schema, Arc::new(HashingEmbedder::new(128))).with_max_connections(max_connections)
}

#[test]
fn test_integration_complementary_pairs() {
    let records = vec![
        record("A", "veterane", json!({"course": "BCC"})),
        record("B", "veterane", json!({"course": "LIC"})),
        record("C", "bixe", json!({"course": "BCC"})),
        record("D", "bixe", json!({"course": "LIC"})),
    ];

    for seed in 0..10 {
        let outcome = matchmaker(course_schema(), 1)
            .run(&records, &mut rng_from_seed(Some(seed)))
            .unwrap();

        assert_eq!(outcome.assignments.len(), 2);
        assert_eq!(outcome.assignments["A"], vec!["C".to_string()]);
        assert_eq!(outcome.assignments["B"], vec!["D".to_string()]);
        assert_eq!(outcome.summary.matched_pairs, 2);
        assert!((outcome.summary.total_weight - 2.0).abs() < 1e-9);
    }
}

#[test]
fn test_integration_no_mentees() {
    let records = vec![
        record("A", "veterane", json!({"course": "BCC"})),
        record("B", "veterane", json!({"course": "LIC"})),
    ];

    let err = matchmaker(course_schema(), 2)
        .run(&records, &mut rng_from_seed(Some(1)))
        .unwrap_err();

    assert!(matches!(err, MatchError::NoMentees));
    assert_eq!(err.to_string(), "No bixes available for matching");
}

#[test]
fn test_integration_no_mentors() {
    let records = vec![record("C", "bixe", json!({"course": "BCC"}))];

    let err = matchmaker(course_schema(), 2)
        .run(&records, &mut rng_from_seed(Some(1)))
        .unwrap_err();

    assert_eq!(err.to_string(), "No veteranes available for matching");
}

#[test]
fn test_integration_empty_input() {
    let err = matchmaker(course_schema(), 2)
        .run(&[], &mut rng_from_seed(Some(1)))
        .unwrap_err();

    assert_eq!(err.to_string(), "No users provided for matching");
}

#[test]
fn test_integration_unknown_kind_is_rejected_at_load() {
    let err = AttributeSchema::from_columns(&[
        column("id", "uuid", None),
        column("role", "role", None),
        column("height", "scalar", Some(1)),
    ])
    .unwrap_err();

    assert!(matches!(err, MatchError::UnknownAttributeKind { .. }));
}

#[test]
fn test_integration_lone_mentor_takes_two_mentees() {
    let records = vec![
        record("A", "veterane", json!({"course": "BCC"})),
        record("C", "bixe", json!({"course": "BCC"})),
        record("D", "bixe", json!({"course": "BCC"})),
    ];
    let mm = matchmaker(course_schema(), 2);

    // Mentor slots always total min(1, 2) * 2 = 2 and land on the only mentor
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(distribute_capacity(1, 2, 2, &mut rng).unwrap(), vec![2]);
    assert_eq!(distribute_capacity(2, 2, 2, &mut rng).unwrap(), vec![1, 1]);

    // Each mentee has a single slot, so both pairings need distinct designated mentor slots
    let mut realized = 0;
    for seed in 0..32 {
        let outcome = mm.run(&records, &mut rng_from_seed(Some(seed))).unwrap();
        assert_eq!(outcome.summary.slots_per_cohort, 2);

        let mentees = &outcome.assignments["A"];
        if outcome.summary.matched_pairs == 2 {
            let distinct: HashSet<&String> = mentees.iter().collect();
            assert_eq!(distinct.len(), 2);
            realized += 1;
        } else {
            assert_eq!(mentees.len(), 1);
        }
    }
    assert!(realized > 0);
}

#[test]
fn test_integration_degraded_free_text() {
    let schema = AttributeSchema::from_columns(&[
        column("id", "uuid", None),
        column("role", "role", None),
        column("course", "binary", Some(1)),
        column("hobby", "embedding", Some(1)),
    ])
    .unwrap();
    let records = vec![
        record("A", "veterane", json!({"course": "BCC", "hobby": "rock"})),
        record("C", "bixe", json!({"course": "BCC", "hobby": "samba"})),
    ];

    let outcome = MatchMaker::new(schema, Arc::new(DisabledEmbedder))
        .run(&records, &mut rng_from_seed(Some(9)))
        .unwrap();

    assert_eq!(outcome.summary.degraded_attributes, vec!["hobby".to_string()]);
    assert_eq!(outcome.assignments["A"], vec!["C".to_string()]);
    assert!((outcome.summary.total_weight - 0.5).abs() < 1e-9);
}

#[test]
fn test_integration_default_survey() {
    let records = vec![
        record("v1", "veterane", json!({
            "course": "BCC", "pronouns": ["Ele/Dele"], "ethnicity": ["Branca"],
            "city": "Campinas", "lgbt": [], "parties": 8,
            "hobby": "rock e xadrez", "music": "rock", "games": "xadrez", "sports": "futebol"
        })),
        record("v2", "veterane", json!({
            "course": "LIC", "pronouns": ["Ela/Dela"], "ethnicity": ["Parda"],
            "city": "Sao Paulo", "lgbt": ["Bissexual"], "parties": 2,
            "hobby": "samba", "music": "samba", "games": "", "sports": "volei"
        })),
        record("b1", "bixe", json!({
            "course": "LIC", "pronouns": ["Ela/Dela"], "ethnicity": ["Parda"],
            "city": "Sao Paulo", "lgbt": ["Bissexual"], "parties": "3",
            "hobby": "samba", "music": "samba e forro", "games": null, "sports": "volei"
        })),
        record("b2", "bixe", json!({
            "course": "BCC", "pronouns": ["Ele/Dele"], "ethnicity": ["Branca"],
            "city": "Campinas", "lgbt": null, "parties": 9,
            "hobby": "xadrez", "music": "rock", "games": "xadrez", "sports": "futebol"
        })),
    ];

    let outcome = MatchMaker::new(AttributeSchema::default(), Arc::new(HashingEmbedder::new(256)))
        .with_max_connections(1)
        .run(&records, &mut rng_from_seed(Some(42)))
        .unwrap();

    assert_eq!(outcome.assignments["v1"], vec!["b2".to_string()]);
    assert_eq!(outcome.assignments["v2"], vec!["b1".to_string()]);
    assert!(outcome.summary.degraded_attributes.is_empty());
}

#[test]
fn test_integration_seeded_runs_are_reproducible() {
    let records: Vec<_> = (0..6)
        .map(|i| {
            let role = if i % 2 == 0 { "veterane" } else { "bixe" };
            let course = if i % 3 == 0 { "BCC" } else { "LIC" };
            record(&format!("p{}", i), role, json!({"course": course}))
        })
        .collect();
    let mm = matchmaker(course_schema(), 2);

    let first = mm.run(&records, &mut rng_from_seed(Some(7))).unwrap();
    let second = mm.run(&records, &mut rng_from_seed(Some(7))).unwrap();

    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first.summary.matched_pairs, second.summary.matched_pairs);
}

/// Best (cardinality, weight) over all matchings, by exhaustive search
fn brute_force_best(graph: &SlotGraph) -> (usize, f64) {
    fn search(graph: &SlotGraph, row: usize, used: &mut Vec<bool>) -> (usize, f64) {
        if row == graph.mentee_slots().len() {
            return (0, 0.0);
        }

        let mut best = search(graph, row + 1, used);
        for col in 0..graph.mentor_slots().len() {
            if used[col] {
                continue;
            }
            let pair = SlotPair { mentee_slot: row, mentor_slot: col };
            if let Some(weight) = graph.weight(pair) {
                used[col] = true;
                let (count, total) = search(graph, row + 1, used);
                used[col] = false;
                let candidate = (count + 1, total + weight);
                if candidate.0 > best.0 || (candidate.0 == best.0 && candidate.1 > best.1 + 1e-9) {
                    best = candidate;
                }
            }
        }
        best
    }

    let mut used = vec![false; graph.mentor_slots().len()];
    search(graph, 0, &mut used)
}

#[test]
fn test_integration_hungarian_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(2024);
    let solver = HungarianSolver::new();

    for _ in 0..60 {
        let mentees = rng.gen_range(1..=3);
        let mentors = rng.gen_range(1..=3);
        let cap = rng.gen_range(1..=2);
        let total = mentees.min(mentors) * cap;

        let matrix = CompatibilityMatrix::from_fn(mentees, mentors, |_, _| {
            if rng.gen_bool(0.2) { 0.0 } else { rng.gen_range(0.0..1.0) }
        });
        let mentee_capacity = distribute_capacity(mentees, total, cap, &mut rng).unwrap();
        let mentor_capacity = distribute_capacity(mentors, total, cap, &mut rng).unwrap();
        let graph = SlotGraph::build(&matrix, &mentee_capacity, &mentor_capacity, &mut rng).unwrap();

        let pairs = solver.solve(&graph).unwrap();
        graph.validate_matching(&pairs).unwrap();
        let weight: f64 = pairs.iter().filter_map(|&p| graph.weight(p)).sum();

        let (best_count, best_weight) = brute_force_best(&graph);
        assert_eq!(pairs.len(), best_count);
        assert!((weight - best_weight).abs() < 1e-9, "got {}, expected {}", weight, best_weight);
    }
}

#[test]
fn test_integration_projection_keeps_duplicates_by_default() {
    // Two slots each and a 1x1 matrix: designated edge plus one zero edge between spare slots
    let matrix = CompatibilityMatrix::from_rows(&[vec![1.0]]).unwrap();
    let graph = SlotGraph::build(&matrix, &[2], &[2], &mut StdRng::seed_from_u64(5)).unwrap();
    let pairs = HungarianSolver::new().solve(&graph).unwrap();
    assert_eq!(pairs.len(), 2);

    let cohorts = Cohorts {
        mentors: vec![Participant { id: "A".into(), role: Role::Mentor, answers: Map::new() }],
        mentees: vec![Participant { id: "C".into(), role: Role::Mentee, answers: Map::new() }],
    };

    let kept = project(&graph, &pairs, &cohorts, false);
    assert_eq!(kept["A"], vec!["C".to_string(), "C".to_string()]);

    let collapsed = project(&graph, &pairs, &cohorts, true);
    assert_eq!(collapsed["A"], vec!["C".to_string()]);
}
