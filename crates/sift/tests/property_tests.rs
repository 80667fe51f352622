//! Property-based tests for the cleaning stages.
//!
//! These tests use proptest to generate record sets and verify that the
//! stages keep their guarantees under all inputs:
//!
//! 1. **Idempotence**: standardizing twice equals standardizing once
//! 2. **Deduplication completeness**: one survivor per identical group
//! 3. **Null resolution**: no blank industry survives
//! 4. **Pruning completeness**: every survivor carries a measurement
//! 5. **Category collapsing**: prefixed industries map to one label
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p sift --test property_tests
//!
//! # Run with more cases
//! PROPTEST_CASES=10000 cargo test -p sift --test property_tests
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use proptest::prelude::*;

use sift::pipeline::{Deduplicator, NullResolver, Pruner, Standardizer};
use sift::{CleaningRules, LabelRule, LayoffRecord, Pipeline, Stage};

// =============================================================================
// Test Strategies
// =============================================================================

/// Company names from a small pool so duplicates and siblings are common.
fn company() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Airbnb".to_string()),
        Just("Casper".to_string()),
        Just(" Casper".to_string()),
        Just("Juul ".to_string()),
        Just("Carvana".to_string()),
    ]
}

/// Industries mixing known labels, prefix variants, blanks and absence.
fn industry() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("  ".to_string())),
        Just(Some("Travel".to_string())),
        Just(Some("Retail".to_string())),
        Just(Some("Crypto".to_string())),
        Just(Some("Crypto Currency".to_string())),
        "Crypto[a-zA-Z ]{0,10}".prop_map(Some),
        "[A-Za-z ]{1,12}".prop_map(Some),
    ]
}

fn country() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("United States".to_string()),
        Just("United States.".to_string()),
        Just("United States..".to_string()),
        Just("Canada".to_string()),
        Just("Canada.".to_string()),
    ]
}

fn record() -> impl Strategy<Value = LayoffRecord> {
    (
        company(),
        industry(),
        prop::option::of(0u64..50),
        prop::option::of(prop_oneof![Just(0.1f64), Just(0.25f64), Just(1.0f64)]),
        prop::option::of(0u32..3),
        country(),
        prop::option::of(prop_oneof![Just(50.0f64), Just(1000.0f64)]),
    )
        .prop_map(|(company, industry, total, percentage, day, country, funds)| {
            LayoffRecord {
                company,
                location: "SF Bay Area".to_string(),
                industry,
                total_laid_off: total,
                percentage_laid_off: percentage,
                event_date: day.and_then(|d| NaiveDate::from_ymd_opt(2022, 1, d + 1)),
                stage: "Series A".to_string(),
                country,
                funds_raised_millions: funds,
            }
        })
}

/// Record sets that often contain exact copies.
fn records() -> impl Strategy<Value = Vec<LayoffRecord>> {
    prop::collection::vec(record(), 0..40).prop_flat_map(|base| {
        let len = base.len();
        let copies = prop::collection::vec(any::<prop::sample::Index>(), 0..10);
        (Just(base), copies).prop_map(move |(mut base, copies)| {
            if len > 0 {
                for idx in copies {
                    let copy = base[idx.index(len)].clone();
                    base.push(copy);
                }
            }
            base
        })
    })
}

fn standardizer() -> Standardizer {
    Standardizer::new(&CleaningRules::default()).unwrap()
}

// =============================================================================
// Stage Properties
// =============================================================================

proptest! {
    /// Standardizing twice produces the same output as standardizing once.
    #[test]
    fn standardizer_is_idempotent(input in records()) {
        let s = standardizer();
        let once = s.apply(&input).unwrap();
        let twice = s.apply(&once.records).unwrap();

        prop_assert_eq!(&once.records, &twice.records);
        prop_assert_eq!(twice.report.values_changed, 0);
    }

    /// Exactly one record survives from each identical group.
    #[test]
    fn deduplication_is_complete(input in records()) {
        let out = Deduplicator::new().apply(&input).unwrap();

        let distinct: HashSet<_> = input.iter().map(LayoffRecord::key).collect();
        let survivors: HashSet<_> = out.records.iter().map(LayoffRecord::key).collect();

        prop_assert_eq!(out.records.len(), distinct.len());
        prop_assert_eq!(survivors, distinct);
        prop_assert_eq!(out.report.rows_removed(), input.len() - out.records.len());
    }

    /// Deduplication keeps first occurrences in input order.
    #[test]
    fn deduplication_preserves_order(input in records()) {
        let out = Deduplicator::new().apply(&input).unwrap();

        let mut seen = HashSet::new();
        let expected: Vec<_> = input
            .iter()
            .filter(|r| seen.insert(r.key()))
            .cloned()
            .collect();
        prop_assert_eq!(out.records, expected);
    }

    /// No blank industry survives null resolution.
    #[test]
    fn no_blank_industry_after_resolution(input in records()) {
        let out = NullResolver::default().apply(&input).unwrap();

        prop_assert_eq!(out.records.len(), input.len());
        for r in &out.records {
            prop_assert!(!r.has_blank_industry());
        }
    }

    /// Back-fill only uses industries that some sibling already had.
    #[test]
    fn backfill_uses_sibling_values(input in records()) {
        let out = NullResolver::default().apply(&input).unwrap();

        for (before, after) in input.iter().zip(&out.records) {
            let was_known = before.industry.as_deref().is_some_and(|i| !i.trim().is_empty());
            if was_known {
                prop_assert_eq!(&before.industry, &after.industry);
            } else if let Some(filled) = &after.industry {
                let sibling_has_it = input.iter().any(|r| {
                    r.company == before.company && r.industry.as_ref() == Some(filled)
                });
                prop_assert!(sibling_has_it);
            }
        }
    }

    /// Every record left after pruning carries a measurement.
    #[test]
    fn pruning_is_complete(input in records()) {
        let out = Pruner::new().apply(&input).unwrap();

        let measured = input.iter().filter(|r| !r.has_no_measurement()).count();
        prop_assert_eq!(out.records.len(), measured);
        for r in &out.records {
            prop_assert!(r.total_laid_off.is_some() || r.percentage_laid_off.is_some());
        }
    }

    /// Any industry starting with a rule prefix maps to that rule's label.
    #[test]
    fn prefixed_industries_collapse(suffix in "[a-zA-Z ]{0,20}") {
        let s = standardizer();
        let value = format!("Crypto{}", suffix);
        prop_assert_eq!(s.canonical_industry(&value), Some("Crypto"));
    }

    /// Ignore-case rules collapse every casing to one label.
    #[test]
    fn ignore_case_rules_collapse(prefix in "(?i)fin", rest in "[a-z]{0,8}") {
        let rules = CleaningRules {
            industry_labels: vec![LabelRule {
                ignore_case: true,
                ..LabelRule::new("Fin", "Finance")
            }],
            ..CleaningRules::default()
        };
        let s = Standardizer::new(&rules).unwrap();
        let value = format!("{}{}", prefix, rest);
        prop_assert_eq!(s.canonical_industry(&value), Some("Finance"));
    }
}

// =============================================================================
// Whole-Pipeline Properties
// =============================================================================

proptest! {
    /// The cleaned output satisfies every dataset invariant.
    #[test]
    fn pipeline_output_invariants(input in records()) {
        let outcome = Pipeline::new().unwrap().run(&input).unwrap();
        let records = &outcome.records;

        let keys: HashSet<_> = records.iter().map(LayoffRecord::key).collect();
        prop_assert_eq!(keys.len(), records.len());

        for r in records {
            prop_assert!(!r.has_no_measurement());
            prop_assert!(!r.has_blank_industry());
            prop_assert_eq!(r.company.trim(), r.company.as_str());
            prop_assert!(!(r.country.starts_with("United States") && r.country.ends_with('.')));
            if let Some(industry) = &r.industry {
                prop_assert!(!industry.starts_with("Crypto") || industry == "Crypto");
            }
        }
    }

    /// Running the pipeline on its own output changes nothing.
    #[test]
    fn pipeline_is_idempotent(input in records()) {
        let pipeline = Pipeline::new().unwrap();
        let first = pipeline.run(&input).unwrap();
        let second = pipeline.run(&first.records).unwrap();

        prop_assert_eq!(&first.records, &second.records);
    }
}
