//! Cross-checks of the similarity matcher against an independent
//! Levenshtein implementation, plus end-to-end recall scenarios.

use studymate_common::similarity::{check_recall, edit_distance, find_similar};
use studymate_common::{similarity, HistoryEntry, RecallSettings};

const SAMPLES: &[&str] = &[
    "",
    "a",
    "kitten",
    "sitting",
    "Saturday",
    "Sunday",
    "What is a binary search tree?",
    "what is a binary-search tree",
    "Explain the chain rule",
    "explain chain rule please",
    "naïve café résumé",
    "naive cafe resume",
    "日本語の文法",
    "日本の文化",
];

#[test]
fn test_edit_distance_matches_strsim() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(
                edit_distance(a, b),
                strsim::levenshtein(a, b),
                "distance mismatch for {:?} / {:?}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_similarity_matches_normalized_levenshtein() {
    // Same formula once both sides are lowercased
    for a in SAMPLES {
        for b in SAMPLES {
            let ours = similarity(a, b);
            let reference = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
            assert!(
                (ours - reference).abs() < 1e-9,
                "similarity mismatch for {:?} / {:?}: {} vs {}",
                a,
                b,
                ours,
                reference
            );
            assert!((0.0..=1.0).contains(&ours));
        }
    }
}

#[test]
fn test_similarity_is_symmetric() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }
}

#[test]
fn test_recall_scenario_in_chronological_order() {
    let history = vec![
        HistoryEntry::user("How does photosynthesis work?"),
        HistoryEntry::assistant("Plants convert light into chemical energy."),
        HistoryEntry::user("What is the derivative of x squared?"),
        HistoryEntry::user("what is the derivative of x squared"),
    ];
    let settings = RecallSettings::default();

    assert_eq!(
        check_recall("What's the derivative of x squared?", &history, &settings),
        Some("What is the derivative of x squared?")
    );
    assert_eq!(
        check_recall("Explain the French revolution", &history, &settings),
        None
    );
}

#[test]
fn test_identical_short_entries_never_match() {
    let history = vec![HistoryEntry::user("abcde"), HistoryEntry::user("xyz")];
    assert_eq!(find_similar("abcde", &history, 5, 0.7), None);
    assert_eq!(find_similar("xyz", &history, 5, 0.7), None);
}
