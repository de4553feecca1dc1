//! Interaction lookup integration tests.
//!
//! Golden pairs are imported from a small dataset file and looked up in
//! both orders; a property test checks order independence for arbitrary pairs.

use std::fs;

use ddi_core::db::{Database, ImportOutcome};
use ddi_core::lookup::{InteractionLookup, LookupError};
use ddi_core::models::InteractionRecord;
use ddi_core::resolver::StaticResolver;
use proptest::prelude::*;

const WARFARIN: &str = "CC(=O)CC(C1=CC=CC=C1)C1=C(O)C2=CC=CC=C2OC1=O";
const ASPIRIN: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";
const IBUPROFEN: &str = "CC(C)CC1=CC=C(C=C1)C(C)C(=O)O";
const METFORMIN: &str = "CN(C)C(=N)N=C(N)N";
const LISINOPRIL: &str = "NCCCCC(NC(CCC1=CC=CC=C1)C(O)=O)C(=O)N1CCCC1C(O)=O";

const DATASET: &str = "\
X1,X2,Top_5_Side_Effects
\"CC(=O)CC(C1=CC=CC=C1)C1=C(O)C2=CC=CC=C2OC1=O\",CC(=O)OC1=CC=CC=C1C(=O)O,\"1: hemorrhage, 2: anaemia\"
CC(C)CC1=CC=C(C=C1)C(C)C(=O)O,NCCCCC(NC(CCC1=CC=CC=C1)C(O)=O)C(=O)N1CCCC1C(O)=O,1: renal failure; 2: hyperkalaemia
,CN(C)C(=N)N=C(N)N,1: orphan row
";

/// Expected outcome for a golden pair.
struct GoldenCase {
    id: &'static str,
    drug_a: &'static str,
    drug_b: &'static str,
    expected_side_effects: Option<&'static str>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "warfarin-aspirin",
            drug_a: "Warfarin",
            drug_b: "Aspirin",
            expected_side_effects: Some("1: hemorrhage, 2: anaemia"),
        },
        GoldenCase {
            id: "ibuprofen-lisinopril",
            drug_a: "ibuprofen",
            drug_b: "LISINOPRIL",
            expected_side_effects: Some("1: renal failure; 2: hyperkalaemia"),
        },
        GoldenCase {
            id: "metformin-lisinopril-absent",
            drug_a: "metformin",
            drug_b: "lisinopril",
            expected_side_effects: None,
        },
        GoldenCase {
            id: "self-pair-absent",
            drug_a: "aspirin",
            drug_b: " aspirin ",
            expected_side_effects: None,
        },
    ]
}

fn resolver() -> StaticResolver {
    StaticResolver::new()
        .with("warfarin", WARFARIN)
        .with("aspirin", ASPIRIN)
        .with("ibuprofen", IBUPROFEN)
        .with("metformin", METFORMIN)
        .with("lisinopril", LISINOPRIL)
}

fn imported_db() -> Database {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interactions.csv");
    fs::write(&path, DATASET).unwrap();

    let mut db = Database::open_in_memory().unwrap();
    let outcome = db.populate_if_empty(&path).unwrap();
    assert_eq!(outcome, ImportOutcome::Imported { inserted: 2, skipped: 1 });
    db
}

#[test]
fn test_golden_cases() {
    let db = imported_db();
    let resolver = resolver();
    let lookup = InteractionLookup::new(&resolver, &db);

    for case in get_golden_cases() {
        for (a, b) in [(case.drug_a, case.drug_b), (case.drug_b, case.drug_a)] {
            let result = lookup.lookup(a, b).unwrap();

            assert_eq!(
                result.found,
                case.expected_side_effects.is_some(),
                "Case {}: found mismatch for ({}, {})",
                case.id,
                a,
                b
            );
            assert_eq!(
                result.side_effects_raw.as_deref(),
                case.expected_side_effects,
                "Case {}: side effects mismatch for ({}, {})",
                case.id,
                a,
                b
            );
            assert_eq!(result.drug_a.name, a.trim(), "Case {}: drug order not preserved", case.id);
        }
    }
}

#[test]
fn test_profile_batch_against_imported_store() {
    let db = imported_db();
    let resolver = resolver();
    let lookup = InteractionLookup::new(&resolver, &db);

    let profile = vec![
        "Aspirin".to_string(),
        "metformin".to_string(),
        "".to_string(),
        "Aspirin".to_string(),
        "unknownium".to_string(),
    ];
    let checks = lookup.lookup_against_profile("warfarin", &profile).unwrap();

    let names: Vec<&str> = checks.iter().map(|c| c.medication.as_str()).collect();
    assert_eq!(names, vec!["Aspirin", "metformin", "unknownium"]);

    assert!(checks[0].outcome.as_ref().unwrap().found);
    assert!(!checks[1].outcome.as_ref().unwrap().found);
    assert_eq!(
        checks[2].outcome,
        Err(LookupError::UnresolvedDrug("unknownium".into()))
    );
}

#[test]
fn test_reimport_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interactions.csv");
    fs::write(&path, DATASET).unwrap();

    let db_path = dir.path().join("ddi.sqlite3");
    {
        let mut db = Database::open(&db_path).unwrap();
        db.populate_if_empty(&path).unwrap();
    }

    let mut db = Database::open(&db_path).unwrap();
    assert_eq!(
        db.populate_if_empty(&path).unwrap(),
        ImportOutcome::AlreadyPopulated { existing: 2 }
    );
}

proptest! {
    #[test]
    fn prop_lookup_is_order_independent(
        pairs in prop::collection::vec(("[a-e]", "[a-e]"), 0..12),
        query in ("[a-e]", "[a-e]"),
    ) {
        let mut db = Database::open_in_memory().unwrap();
        let records: Vec<InteractionRecord> = pairs
            .iter()
            .enumerate()
            .map(|(i, (x, y))| InteractionRecord::new(format!("ID-{}", x), format!("ID-{}", y), format!("{}: effect", i)))
            .collect();
        db.insert_interactions(&records).unwrap();

        let mut resolver = StaticResolver::new();
        for name in ["a", "b", "c", "d", "e"] {
            resolver.insert(name, &format!("ID-{}", name));
        }
        let lookup = InteractionLookup::new(&resolver, &db);

        let (a, b) = query;
        let forward = lookup.lookup(&a, &b).unwrap();
        let reverse = lookup.lookup(&b, &a).unwrap();

        prop_assert_eq!(forward.found, reverse.found);
        prop_assert_eq!(&forward.side_effects_raw, &reverse.side_effects_raw);

        let expected = pairs.iter().any(|(x, y)| (x == &a && y == &b) || (x == &b && y == &a));
        prop_assert_eq!(forward.found, expected);
    }
}
